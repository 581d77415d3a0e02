#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write `content` to `dir/file_name`, creating `dir` when missing.
///
/// Returns the absolute path of the written file. The file handle is scoped to
/// this call and closed on every return path.
pub fn write_output(dir: &Path, file_name: &str, content: &[u8]) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir).map_err(|e| {
        AppError::new(
            ErrorCategory::IoError,
            format!("Failed to create output directory {}: {}", dir.display(), e),
        )
    })?;

    let path = dir.join(file_name);
    let mut file = fs::File::create(&path).map_err(|e| {
        AppError::new(
            ErrorCategory::IoError,
            format!("Failed to create {}: {}", path.display(), e),
        )
    })?;
    file.write_all(content)
        .and_then(|_| file.flush())
        .map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to write {}: {}", path.display(), e),
            )
        })?;

    let absolute = path.canonicalize().unwrap_or(path);
    tracing::debug!(path = %absolute.display(), bytes = content.len(), "wrote output");
    Ok(absolute)
}
