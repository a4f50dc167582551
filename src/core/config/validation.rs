#![allow(clippy::result_large_err)]

use super::PromoteConfig;
use crate::core::error::AppError;
use crate::core::steps::STEP_NAMES;
use crate::core::types::ErrorCategory;

/// Widest indentation accepted for written documents.
pub const MAX_INDENT_WIDTH: usize = 16;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &PromoteConfig) -> Result<(), AppError> {
        if config.output.indent_width > MAX_INDENT_WIDTH {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!(
                    "output.indent_width must be at most {} (got {})",
                    MAX_INDENT_WIDTH, config.output.indent_width
                ),
            )
            .with_code("CONFIG-003"));
        }

        let unknown: Vec<&str> = config
            .pipeline
            .default_steps
            .iter()
            .map(String::as_str)
            .filter(|step| !STEP_NAMES.contains(step))
            .collect();
        if !unknown.is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!(
                    "pipeline.default_steps contains unknown steps: {} (expected: {})",
                    unknown.join(", "),
                    STEP_NAMES.join(", ")
                ),
            )
            .with_code("CONFIG-003"));
        }

        Ok(())
    }
}
