#![allow(clippy::result_large_err)]

use super::Environment;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::BTreeMap;

/// Names of the three quantitative-resource families for one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceAliases {
    pub adf: String,
    pub dw: String,
    pub adb: String,
}

/// Parameters every rewrite step needs for one environment.
#[derive(Debug, Clone)]
pub struct EnvironmentProfile {
    pub environment: Environment,
    pub notification_dest: String,
    pub remedy_urgency: String,
    pub resources: ResourceAliases,
    /// Matches this environment's name tag (e.g. `-DEV-`) when it is a promotion source.
    pub env_tag_pattern: Option<Regex>,
    /// Literal written over the source tag when this environment is a promotion target.
    pub env_tag_replacement: Option<String>,
    pub user_suffix: String,
    pub node_env_id: String,
    pub datacenter_pattern: Option<Regex>,
    pub datacenter_replacement: Option<String>,
    pub job_suffix_to_add: String,
    pub job_suffix_to_remove: String,
}

struct ProfileLiteral {
    environment: Environment,
    notification_dest: &'static str,
    remedy_urgency: &'static str,
    adf: &'static str,
    dw: &'static str,
    adb: &'static str,
    env_tag_pattern: Option<&'static str>,
    env_tag_replacement: Option<&'static str>,
    user_suffix: &'static str,
    node_env_id: &'static str,
    datacenter_pattern: Option<&'static str>,
    datacenter_replacement: Option<&'static str>,
    job_suffix_to_add: &'static str,
    job_suffix_to_remove: &'static str,
}

const STANDARD_PROFILES: [ProfileLiteral; 3] = [
    ProfileLiteral {
        environment: Environment::Dev,
        notification_dest: "dev-alerts@example.com",
        remedy_urgency: "L",
        adf: "ADFDEV",
        dw: "DWDEV",
        adb: "ADBDEV",
        env_tag_pattern: Some(r"-DEV-"),
        env_tag_replacement: None,
        user_suffix: "_dev",
        node_env_id: "dev",
        datacenter_pattern: Some(r"dev_dc_\d+"),
        datacenter_replacement: None,
        job_suffix_to_add: "",
        job_suffix_to_remove: "-preprod",
    },
    ProfileLiteral {
        environment: Environment::Preprod,
        notification_dest: "preprod-alerts@example.com",
        remedy_urgency: "M",
        adf: "APP-AZ-ADF-PP",
        dw: "DWPREPROD",
        adb: "APP-AZ-ADB-PP",
        env_tag_pattern: Some(r"-PREPROD-"),
        env_tag_replacement: Some("-PREPROD-"),
        user_suffix: "_pp",
        node_env_id: "pp",
        datacenter_pattern: Some(r"preprod_dc_\d+"),
        datacenter_replacement: Some("preprod_dc_1"),
        job_suffix_to_add: "-preprod",
        job_suffix_to_remove: "",
    },
    ProfileLiteral {
        environment: Environment::Prod,
        notification_dest: "prod-support@example.com",
        remedy_urgency: "H",
        adf: "APP-AZ-ADF",
        dw: "DWPROD",
        adb: "APP-AZ-ADB",
        env_tag_pattern: None,
        env_tag_replacement: Some("-PROD-"),
        user_suffix: "",
        node_env_id: "prod",
        datacenter_pattern: None,
        datacenter_replacement: Some("prod_dc_1"),
        job_suffix_to_add: "",
        job_suffix_to_remove: "-preprod",
    },
];

impl ProfileLiteral {
    fn compile(&self) -> Result<EnvironmentProfile, AppError> {
        Ok(EnvironmentProfile {
            environment: self.environment,
            notification_dest: self.notification_dest.to_string(),
            remedy_urgency: self.remedy_urgency.to_string(),
            resources: ResourceAliases {
                adf: self.adf.to_string(),
                dw: self.dw.to_string(),
                adb: self.adb.to_string(),
            },
            env_tag_pattern: self
                .env_tag_pattern
                .map(|pattern| compile_pattern(self.environment, "env_tag_pattern", pattern))
                .transpose()?,
            env_tag_replacement: self.env_tag_replacement.map(str::to_string),
            user_suffix: self.user_suffix.to_string(),
            node_env_id: self.node_env_id.to_string(),
            datacenter_pattern: self
                .datacenter_pattern
                .map(|pattern| compile_pattern(self.environment, "datacenter_pattern", pattern))
                .transpose()?,
            datacenter_replacement: self.datacenter_replacement.map(str::to_string),
            job_suffix_to_add: self.job_suffix_to_add.to_string(),
            job_suffix_to_remove: self.job_suffix_to_remove.to_string(),
        })
    }
}

fn compile_pattern(
    environment: Environment,
    field: &str,
    pattern: &str,
) -> Result<Regex, AppError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|err| {
            AppError::new(
                ErrorCategory::InternalError,
                format!("{} profile has an invalid {}: {}", environment, field, err),
            )
            .with_code("PROFILE-001")
        })
}

/// Immutable mapping from environment to its profile.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: BTreeMap<Environment, EnvironmentProfile>,
}

impl ProfileTable {
    /// Build the built-in dev/preprod/prod table, compiling every pattern once.
    pub fn standard() -> Result<Self, AppError> {
        let profiles = STANDARD_PROFILES
            .iter()
            .map(ProfileLiteral::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_profiles(profiles)
    }

    /// Build a table from explicit profiles, rejecting internally inconsistent entries.
    pub fn from_profiles<I>(profiles: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = EnvironmentProfile>,
    {
        let table = ProfileTable {
            profiles: profiles
                .into_iter()
                .map(|profile| (profile.environment, profile))
                .collect(),
        };
        table.validate()?;
        Ok(table)
    }

    /// Drop one environment's profile.
    pub fn without(mut self, environment: Environment) -> Self {
        self.profiles.remove(&environment);
        self
    }

    pub fn get(&self, environment: Environment) -> Option<&EnvironmentProfile> {
        self.profiles.get(&environment)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnvironmentProfile> {
        self.profiles.values()
    }

    pub fn summaries(&self) -> Vec<ProfileSummary> {
        self.iter().map(ProfileSummary::from).collect()
    }

    fn validate(&self) -> Result<(), AppError> {
        for profile in self.profiles.values() {
            let env = profile.environment;
            let mut missing = Vec::new();
            if env.is_promotion_source() {
                if profile.env_tag_pattern.is_none() {
                    missing.push("env_tag_pattern");
                }
                if profile.datacenter_pattern.is_none() {
                    missing.push("datacenter_pattern");
                }
                if profile.user_suffix.is_empty() {
                    missing.push("user_suffix");
                }
                if profile.node_env_id.is_empty() {
                    missing.push("node_env_id");
                }
            }
            if env.is_promotion_target() {
                if profile.env_tag_replacement.is_none() {
                    missing.push("env_tag_replacement");
                }
                if profile.datacenter_replacement.is_none() {
                    missing.push("datacenter_replacement");
                }
            }
            let aliases = &profile.resources;
            if aliases.adf.is_empty() || aliases.dw.is_empty() || aliases.adb.is_empty() {
                missing.push("resource aliases");
            }
            if !missing.is_empty() {
                return Err(AppError::new(
                    ErrorCategory::InternalError,
                    format!(
                        "{} profile is missing required fields: {}",
                        env,
                        missing.join(", ")
                    ),
                )
                .with_code("PROFILE-001"));
            }
        }
        Ok(())
    }
}

/// Printable view of a profile.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub environment: Environment,
    pub notification_dest: String,
    pub remedy_urgency: String,
    pub resources: ResourceAliases,
    pub env_tag_pattern: Option<String>,
    pub env_tag_replacement: Option<String>,
    pub user_suffix: String,
    pub node_env_id: String,
    pub datacenter_pattern: Option<String>,
    pub datacenter_replacement: Option<String>,
    pub job_suffix_to_add: String,
    pub job_suffix_to_remove: String,
}

impl From<&EnvironmentProfile> for ProfileSummary {
    fn from(profile: &EnvironmentProfile) -> Self {
        ProfileSummary {
            environment: profile.environment,
            notification_dest: profile.notification_dest.clone(),
            remedy_urgency: profile.remedy_urgency.clone(),
            resources: profile.resources.clone(),
            env_tag_pattern: profile.env_tag_pattern.as_ref().map(|re| re.as_str().to_string()),
            env_tag_replacement: profile.env_tag_replacement.clone(),
            user_suffix: profile.user_suffix.clone(),
            node_env_id: profile.node_env_id.clone(),
            datacenter_pattern: profile
                .datacenter_pattern
                .as_ref()
                .map(|re| re.as_str().to_string()),
            datacenter_replacement: profile.datacenter_replacement.clone(),
            job_suffix_to_add: profile.job_suffix_to_add.clone(),
            job_suffix_to_remove: profile.job_suffix_to_remove.clone(),
        }
    }
}
