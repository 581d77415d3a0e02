//! Acquisition of the source workflow document.
//!
//! A source is a local file, an HTTP(S) URL, or a steplib repository that is
//! shallow-cloned into a temporary directory. Fetching yields the raw bytes;
//! parsing is left to [`crate::core::document::parse`].

mod git;

use crate::core::config::SourceConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::fmt;
use std::io;
use std::path::PathBuf;
use url::Url;

pub use git::clone_document;

/// Where to read the workflow document from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    File(PathBuf),
    Url(Url),
    Git { url: String, document: PathBuf },
}

impl SourceSpec {
    /// Interpret a user-supplied location: `http(s)://` URLs are fetched,
    /// anything else is a local path.
    pub fn from_location(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => SourceSpec::Url(url),
            _ => SourceSpec::File(PathBuf::from(location)),
        }
    }

    /// Git source for a steplib repository name.
    pub fn from_repo(config: &SourceConfig, repo: &str) -> Self {
        SourceSpec::Git {
            url: config.repo_url(repo),
            document: config.document.clone(),
        }
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::File(path) => write!(f, "{}", path.display()),
            SourceSpec::Url(url) => write!(f, "{}", url),
            SourceSpec::Git { url, document } => write!(f, "{}#{}", url, document.display()),
        }
    }
}

/// Error types for document acquisition.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("request to {url} failed: {source}")]
    Http {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("git is not available: {0}")]
    GitUnavailable(#[source] io::Error),
    #[error("git clone of {url} failed: {stderr}")]
    Clone { url: String, stderr: String },
    #[error("failed to prepare clone directory: {0}")]
    Workspace(#[source] io::Error),
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        let suggestion = match &err {
            FetchError::Read { .. } => "check that the source path exists and is readable",
            FetchError::Http { .. } => "check the URL and network connectivity",
            FetchError::GitUnavailable(_) => "install git or pass --source with a local path",
            FetchError::Clone { .. } => "check the repository name and base URL",
            FetchError::Workspace(_) => "check permissions of the temporary directory",
        };
        let message = err.to_string();
        AppError::with_source(ErrorCategory::FetchError, message, Box::new(err))
            .with_suggestion(suggestion)
    }
}

/// Fetch the raw document bytes.
pub async fn fetch(spec: &SourceSpec) -> Result<Vec<u8>, FetchError> {
    tracing::info!(source = %spec, "fetching workflow document");
    let bytes = match spec {
        SourceSpec::File(path) => {
            tokio::fs::read(path)
                .await
                .map_err(|source| FetchError::Read {
                    path: path.clone(),
                    source,
                })?
        }
        SourceSpec::Url(url) => fetch_url(url).await?,
        SourceSpec::Git { url, document } => clone_document(url, document).await?,
    };
    tracing::debug!(bytes = bytes.len(), "fetched workflow document");
    Ok(bytes)
}

async fn fetch_url(url: &Url) -> Result<Vec<u8>, FetchError> {
    let wrap = |source| FetchError::Http {
        url: url.clone(),
        source,
    };
    let response = reqwest::get(url.clone())
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(wrap)?;
    let body = response.bytes().await.map_err(wrap)?;
    Ok(body.to_vec())
}
