#![allow(clippy::result_large_err)]

use super::StepcutConfig;
use crate::core::document::WorkflowName;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &StepcutConfig) -> Result<(), AppError> {
        if config.source.repo.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "source.repo cannot be empty",
            ));
        }

        if config.source.document.as_os_str().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "source.document cannot be empty",
            ));
        }

        if config.source.document.is_absolute() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "source.document must be relative to the repository root",
            ));
        }

        let file_name = config.output.file_name.trim();
        if file_name.is_empty() || file_name.contains(|c: char| c == '/' || c == '\\') {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "output.file_name must be a plain, non-empty file name",
            ));
        }

        Self::target_workflow(config)?;
        Ok(())
    }

    /// Resolve `prune.workflow` to a known workflow name.
    pub fn target_workflow(config: &StepcutConfig) -> Result<WorkflowName, AppError> {
        config
            .prune
            .workflow
            .parse::<WorkflowName>()
            .map_err(|message| {
                AppError::new(ErrorCategory::ValidationError, format!("prune.workflow: {}", message))
            })
    }
}
