#![allow(clippy::result_large_err)]

use crate::core::document::Element;
use crate::core::environment::{Environment, ProfileTable};
use crate::core::error::AppError;
use crate::core::templates::NotificationTemplates;
use std::collections::HashMap;
use std::sync::Arc;

pub mod activate;
pub mod notifications;
pub mod promote;
pub mod resources;

pub use activate::{activate_folders, FolderActivation};
pub use notifications::{standardize_notifications, NotificationStandardizer};
pub use promote::{apply_environment_promotion, EnvironmentPromoter, PromotionRules};
pub use resources::{standardize_resources, ResourceStandardizer, BASELINE_RESOURCE};

/// Step names accepted on the command line, in documentation order.
pub const STEP_NAMES: [&str; 4] = ["activate", "promote", "resources", "notifications"];

/// What a step did to the working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step ran; `changes` is its diagnostic counter.
    Applied { changes: usize },
    /// Legitimate no-op for this target (e.g. dev); counts as success.
    Skipped { reason: String },
}

impl StepOutcome {
    pub fn changes(&self) -> usize {
        match self {
            StepOutcome::Applied { changes } => *changes,
            StepOutcome::Skipped { .. } => 0,
        }
    }
}

/// One composable rewrite over a document root.
pub trait RewriteStep: Send + Sync + 'static {
    /// Name used in step lists.
    fn name(&self) -> &'static str;

    /// Whether the target environment influences this step.
    fn requires_target(&self) -> bool {
        true
    }

    /// Mutate `root` in place.
    fn apply(&self, root: &mut Element, target: Environment) -> Result<StepOutcome, AppError>;
}

/// Builder used to register steps before running a pipeline.
pub struct StepRegistryBuilder {
    steps: HashMap<String, Arc<dyn RewriteStep>>,
}

impl Default for StepRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StepRegistryBuilder {
    pub fn new() -> Self {
        Self {
            steps: HashMap::new(),
        }
    }

    pub fn register<T: RewriteStep>(&mut self, step: T) -> &mut Self {
        let name = step.name();
        if self.steps.contains_key(name) {
            panic!("duplicate step registered: {}", name);
        }
        self.steps.insert(name.to_string(), Arc::new(step));
        self
    }

    pub fn build(self) -> StepRegistry {
        StepRegistry {
            inner: Arc::new(self.steps),
        }
    }
}

/// Immutable name → step lookup.
#[derive(Clone)]
pub struct StepRegistry {
    inner: Arc<HashMap<String, Arc<dyn RewriteStep>>>,
}

impl StepRegistry {
    pub fn builder() -> StepRegistryBuilder {
        StepRegistryBuilder::new()
    }

    /// The four standard steps sharing one profile table and template set.
    pub fn standard(profiles: Arc<ProfileTable>, templates: Arc<NotificationTemplates>) -> Self {
        let mut builder = StepRegistryBuilder::new();
        builder
            .register(FolderActivation)
            .register(EnvironmentPromoter::new(Arc::clone(&profiles)))
            .register(ResourceStandardizer::new(Arc::clone(&profiles)))
            .register(NotificationStandardizer::new(templates));
        builder.build()
    }

    /// Standard steps over the built-in profiles and templates.
    pub fn with_defaults() -> Result<Self, AppError> {
        let profiles = Arc::new(ProfileTable::standard()?);
        let templates = Arc::new(NotificationTemplates::build(&profiles));
        Ok(Self::standard(profiles, templates))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn RewriteStep>> {
        self.inner.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.inner.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Built-in profiles and templates for the standalone step functions.
pub(crate) fn builtin_profiles() -> Result<Arc<ProfileTable>, AppError> {
    Ok(Arc::new(ProfileTable::standard()?))
}
