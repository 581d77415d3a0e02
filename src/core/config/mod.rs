use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod loader;
mod validation;

pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
pub use validation::ConfigValidator;

/// Main stepcut configuration loaded from stepcut.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StepcutConfig {
    /// Where the workflow document comes from
    #[serde(default)]
    pub source: SourceConfig,

    /// Where the modified document is written
    #[serde(default)]
    pub output: OutputConfig,

    /// Which workflow the script prune targets
    #[serde(default)]
    pub prune: PruneConfig,
}

/// Source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Steplib repository holding the document
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Base URL the repository name is appended to
    #[serde(default = "default_repo_base_url")]
    pub repo_base_url: String,

    /// Document path inside the cloned repository
    #[serde(default = "default_document")]
    pub document: PathBuf,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory, created when missing
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// File name of the modified document
    #[serde(default = "default_output_file_name")]
    pub file_name: String,
}

/// Prune configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PruneConfig {
    /// Workflow whose step list is pruned
    #[serde(default = "default_workflow")]
    pub workflow: String,
}

impl SourceConfig {
    /// Clone URL for a steplib repository name.
    pub fn repo_url(&self, repo: &str) -> String {
        format!("{}/{}.git", self.repo_base_url.trim_end_matches('/'), repo)
    }
}

// Default functions
fn default_repo() -> String {
    "steps-ios-auto-provision".to_string()
}

fn default_repo_base_url() -> String {
    "https://github.com/bitrise-steplib".to_string()
}

fn default_document() -> PathBuf {
    PathBuf::from("bitrise.yml")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("temp")
}

fn default_output_file_name() -> String {
    "modified_bitrise.yml".to_string()
}

fn default_workflow() -> String {
    "_common".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            repo: default_repo(),
            repo_base_url: default_repo_base_url(),
            document: default_document(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: default_output_dir(),
            file_name: default_output_file_name(),
        }
    }
}

impl Default for PruneConfig {
    fn default() -> Self {
        PruneConfig {
            workflow: default_workflow(),
        }
    }
}
