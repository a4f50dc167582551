#![allow(clippy::result_large_err)]

use super::{ConfigValidator, PromoteConfig};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::Path;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "ctm-promote.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from the working directory (workspace/ctm-promote.toml)
    /// Environment variables override config file values
    /// A missing file yields defaults (plus env vars)
    pub fn load_from_workspace(workspace_path: &Path) -> Result<PromoteConfig, AppError> {
        let config_path = workspace_path.join(CONFIG_FILE_NAME);
        let config_file = Self::load_from_file(&config_path)?;
        Self::finish(config_file.unwrap_or_default())
    }

    /// Load from an explicit `--config` path, which must exist, or fall back to the workspace file.
    pub fn load(workspace_path: &Path, explicit: Option<&Path>) -> Result<PromoteConfig, AppError> {
        let Some(path) = explicit else {
            return Self::load_from_workspace(workspace_path);
        };
        match Self::load_from_file(path)? {
            Some(config) => Self::finish(config),
            None => Err(AppError::new(
                ErrorCategory::IoError,
                format!("Config file {} does not exist", path.display()),
            )
            .with_code("CONFIG-001")),
        }
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<PromoteConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
            .with_code("CONFIG-001")
        })?;

        let config: PromoteConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigurationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code("CONFIG-002")
        })?;

        tracing::debug!("loaded config from {}", path.display());
        Ok(Some(config))
    }

    fn finish(mut config: PromoteConfig) -> Result<PromoteConfig, AppError> {
        Self::apply_env_overrides(&mut config);
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    /// Environment variables take precedence over config file values
    fn apply_env_overrides(config: &mut PromoteConfig) {
        if let Ok(width_str) = env::var("CTM_PROMOTE_INDENT_WIDTH") {
            match width_str.trim().parse::<usize>() {
                Ok(width) => config.output.indent_width = width,
                Err(_) => tracing::warn!(
                    "ignoring CTM_PROMOTE_INDENT_WIDTH={:?}: not a number",
                    width_str
                ),
            }
        }

        if let Ok(steps) = env::var("CTM_PROMOTE_DEFAULT_STEPS") {
            config.pipeline.default_steps = steps
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|step| !step.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
}
