use clap::Args;
use std::path::PathBuf;

/// Where the workflow document is read from.
///
/// `--source` wins over `--repo`; with neither, the configured steplib
/// repository is cloned.
#[derive(Args, Clone, Debug, Default)]
pub struct SourceArgs {
    /// Local path or http(s) URL of the workflow document
    #[arg(long, value_name = "PATH|URL", help_heading = "Source")]
    pub source: Option<String>,

    /// Steplib repository to clone instead of the configured one
    #[arg(
        long,
        value_name = "NAME",
        conflicts_with = "source",
        help_heading = "Source"
    )]
    pub repo: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct PruneArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Workflow whose leading script steps are removed (default: _common)
    #[arg(long, value_name = "NAME")]
    pub workflow: Option<String>,

    /// Directory the modified document is written to (default: temp)
    #[arg(long, value_name = "DIR", help_heading = "Output")]
    pub output_dir: Option<PathBuf>,

    /// File name of the modified document (default: modified_bitrise.yml)
    #[arg(long, value_name = "FILE", help_heading = "Output")]
    pub file_name: Option<String>,

    /// Print the modified document to stdout instead of writing it
    #[arg(long, help_heading = "Output")]
    pub dry_run: bool,
}

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Emit either terminal-friendly text or machine-readable JSON
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: CheckFormat,
}

#[derive(Clone, Copy, clap::ValueEnum, Debug, PartialEq, Eq)]
pub enum CheckFormat {
    /// One finding per line
    Text,
    /// JSON array of findings
    Json,
}

#[derive(Args, Clone, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only list this workflow (default: every populated workflow)
    #[arg(long, value_name = "NAME")]
    pub workflow: Option<String>,
}
