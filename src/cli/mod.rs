pub mod args;
pub mod commands;

pub use args::{CheckArgs, CheckFormat, PruneArgs, ShowArgs, SourceArgs};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
DOCUMENT COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "stepcut")]
#[command(version = crate::VERSION)]
#[command(about = "Prune redundant inline script steps from a bitrise.yml workflow document")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: check the document for fields the model drops, then prune and review the written copy."
)]
pub struct Args {
    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Path to custom config file (default: ./stepcut.toml)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Remove the first two script steps of a workflow",
        long_about = "Prune fetches the document, drops the first two inline script steps of the target workflow, and writes the re-serialized document to the output directory.",
        after_help = "Example:\n    stepcut prune --source ./bitrise.yml --output-dir temp"
    )]
    Prune(PruneArgs),
    #[command(
        about = "Report fields the document model does not recognize",
        long_about = "Check parses the document and lists every field that would be dropped on re-serialization, without writing anything.",
        after_help = "Example:\n    stepcut check --source ./bitrise.yml --format json"
    )]
    Check(CheckArgs),
    #[command(
        about = "List the steps of each populated workflow",
        long_about = "Show prints the step keys of every populated workflow in document order, marking the inline script steps a prune would consider.",
        after_help = "Example:\n    stepcut show --source ./bitrise.yml --workflow _common"
    )]
    Show(ShowArgs),
}

pub async fn run(args: Args) -> crate::Result<()> {
    let config = commands::load_config(args.config.as_deref())?;
    match args.command {
        Command::Prune(prune_args) => commands::prune(prune_args, &config).await,
        Command::Check(check_args) => commands::check(check_args, &config).await,
        Command::Show(show_args) => commands::show(show_args, &config).await,
    }
}
