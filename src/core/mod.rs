pub mod config;
pub mod document;
pub mod environment;
pub mod error;
pub mod pipeline;
pub mod steps;
pub mod templates;
pub mod types;

pub use config::{ConfigLoader, ConfigValidator, PromoteConfig};
pub use document::{DocumentError, Element};
pub use environment::{Environment, EnvironmentProfile, ProfileTable};
pub use error::AppError;
pub use pipeline::{PipelineReport, PipelineRun, PipelineRunner, StepRecord};
pub use steps::{RewriteStep, StepOutcome, StepRegistry};
pub use templates::NotificationTemplates;
pub use types::*;
