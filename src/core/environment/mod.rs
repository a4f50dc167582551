use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod profile;

pub use profile::{EnvironmentProfile, ProfileSummary, ProfileTable, ResourceAliases};

/// Deployment environments along the fixed promotion chain dev → preprod → prod.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Preprod,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Environment::Dev, Environment::Preprod, Environment::Prod];

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Preprod => "preprod",
            Environment::Prod => "prod",
        }
    }

    /// The environment a document is promoted *from* when targeting `self`.
    /// Promotions are single steps, so `Dev` has no source.
    pub fn promotion_source(self) -> Option<Environment> {
        match self {
            Environment::Dev => None,
            Environment::Preprod => Some(Environment::Dev),
            Environment::Prod => Some(Environment::Preprod),
        }
    }

    pub fn is_promotion_target(self) -> bool {
        self.promotion_source().is_some()
    }

    pub fn is_promotion_source(self) -> bool {
        Environment::ALL
            .iter()
            .any(|candidate| candidate.promotion_source() == Some(self))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "preprod" => Ok(Environment::Preprod),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!(
                "invalid environment '{}'; supported values are dev, preprod, prod",
                value
            )),
        }
    }
}
