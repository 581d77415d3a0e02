use clap::Parser;
use stepcut::{cli, logging};

#[tokio::main]
async fn main() -> stepcut::Result<()> {
    let args = cli::Args::parse();
    let workspace = std::env::current_dir()?;
    let _guard = logging::init(
        Some(workspace.as_path()),
        args.config.as_deref(),
        args.verbose,
    )?;
    cli::run(args).await
}
