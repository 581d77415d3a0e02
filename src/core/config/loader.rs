#![allow(clippy::result_large_err)]

use super::{ConfigValidator, StepcutConfig};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "stepcut.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from workspace root (workspace/stepcut.toml)
    /// Environment variables override config file values
    /// A missing file yields defaults plus env overrides
    pub fn load_from_workspace(workspace_path: &Path) -> Result<StepcutConfig, AppError> {
        let config_path = workspace_path.join(CONFIG_FILE_NAME);
        let config = Self::load_from_file(&config_path)?.unwrap_or_default();
        Self::finish(config)
    }

    /// Load config from an explicit path, which must exist
    pub fn load_explicit(path: &Path) -> Result<StepcutConfig, AppError> {
        let config = Self::load_from_file(path)?.ok_or_else(|| {
            AppError::new(
                ErrorCategory::IoError,
                format!("config file {} does not exist", path.display()),
            )
        })?;
        Self::finish(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<StepcutConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: StepcutConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(Some(config))
    }

    fn finish(mut config: StepcutConfig) -> Result<StepcutConfig, AppError> {
        Self::apply_env_overrides(&mut config);
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    /// Environment variables take precedence over config file values
    fn apply_env_overrides(config: &mut StepcutConfig) {
        if let Ok(repo) = env::var("STEPCUT_REPO") {
            config.source.repo = repo;
        }

        if let Ok(base_url) = env::var("STEPCUT_REPO_BASE_URL") {
            config.source.repo_base_url = base_url;
        }

        if let Ok(document) = env::var("STEPCUT_DOCUMENT") {
            config.source.document = PathBuf::from(document);
        }

        if let Ok(dir) = env::var("STEPCUT_OUTPUT_DIR") {
            config.output.dir = PathBuf::from(dir);
        }

        if let Ok(file_name) = env::var("STEPCUT_OUTPUT_FILE") {
            config.output.file_name = file_name;
        }

        if let Ok(workflow) = env::var("STEPCUT_WORKFLOW") {
            config.prune.workflow = workflow;
        }
    }
}
