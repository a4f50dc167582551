use crate::core::document::xml::DEFAULT_INDENT_WIDTH;
use crate::core::steps::STEP_NAMES;
use serde::{Deserialize, Serialize};

/// Tool configuration loaded from ctm-promote.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PromoteConfig {
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Pipeline configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// Spaces per nesting level in written documents
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Steps run by `apply` when `--steps` is not given
    #[serde(default = "default_steps")]
    pub default_steps: Vec<String>,
}

fn default_indent_width() -> usize {
    DEFAULT_INDENT_WIDTH
}

fn default_steps() -> Vec<String> {
    STEP_NAMES.iter().map(|name| name.to_string()).collect()
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            indent_width: default_indent_width(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            default_steps: default_steps(),
        }
    }
}


pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;
