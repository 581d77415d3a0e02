use crate::{
    cli::args::{CheckArgs, CheckFormat, PruneArgs, ShowArgs, SourceArgs},
    core::{
        config::{ConfigLoader, ConfigValidator, StepcutConfig},
        document::{self, ParsedDocument, Workflow, WorkflowName},
        error::AppError,
        transform::{apply_transforms, DocumentTransform, ScriptPruneTransform},
        types::ErrorCategory,
    },
    source::{self, SourceSpec},
    utils::write_output,
    Result,
};
use std::{
    env,
    io::{self, Write},
    path::Path,
};

/// Load `--config` when given, otherwise `stepcut.toml` in the current directory.
pub fn load_config(explicit: Option<&Path>) -> Result<StepcutConfig> {
    let config = match explicit {
        Some(path) => ConfigLoader::load_explicit(path)?,
        None => ConfigLoader::load_from_workspace(&env::current_dir()?)?,
    };
    Ok(config)
}

/// Pick the document source: `--source`, then `--repo`, then the configured repository.
pub fn resolve_source(args: &SourceArgs, config: &StepcutConfig) -> SourceSpec {
    if let Some(location) = &args.source {
        return SourceSpec::from_location(location);
    }
    let repo = args.repo.as_deref().unwrap_or(&config.source.repo);
    SourceSpec::from_repo(&config.source, repo)
}

/// Resolve a workflow name given on the command line, falling back to the configured target.
fn resolve_workflow(flag: Option<&str>, config: &StepcutConfig) -> Result<WorkflowName> {
    let name = match flag {
        Some(name) => name.parse::<WorkflowName>().map_err(|message| {
            AppError::new(ErrorCategory::ValidationError, format!("--workflow: {}", message))
        })?,
        None => ConfigValidator::target_workflow(config)?,
    };
    Ok(name)
}

async fn load_document(args: &SourceArgs, config: &StepcutConfig) -> Result<ParsedDocument> {
    let spec = resolve_source(args, config);
    let bytes = source::fetch(&spec).await.map_err(AppError::from)?;
    let parsed = document::parse(&bytes)?;
    for mismatch in &parsed.mismatches {
        tracing::warn!(
            code = mismatch.code(),
            location = %mismatch.location,
            field = %mismatch.field,
            "dropping unrecognized field"
        );
    }
    Ok(parsed)
}

/// Transforms run by `prune`, in order.
fn prune_pipeline(target: WorkflowName) -> Vec<Box<dyn DocumentTransform>> {
    vec![Box::new(ScriptPruneTransform::new(target))]
}

pub async fn prune(args: PruneArgs, config: &StepcutConfig) -> Result<()> {
    let target = resolve_workflow(args.workflow.as_deref(), config)?;
    let mut parsed = load_document(&args.source, config).await?;

    apply_transforms(&mut parsed.document, &prune_pipeline(target));
    let rendered = document::serialize(&parsed.document)?;

    if args.dry_run {
        let mut stdout = io::stdout().lock();
        stdout.write_all(&rendered)?;
        stdout.flush()?;
        return Ok(());
    }

    let output_dir = args.output_dir.as_deref().unwrap_or(&config.output.dir);
    let file_name = args
        .file_name
        .as_deref()
        .unwrap_or(&config.output.file_name);
    let written = write_output(output_dir, file_name, &rendered)?;
    tracing::info!(path = %written.display(), "wrote modified document");
    println!("{}", written.display());
    Ok(())
}

pub async fn check(args: CheckArgs, config: &StepcutConfig) -> Result<()> {
    let parsed = load_document(&args.source, config).await?;
    match args.format {
        CheckFormat::Text => {
            if parsed.mismatches.is_empty() {
                println!("No unrecognized fields");
            }
            for mismatch in &parsed.mismatches {
                println!("[{}] {}", mismatch.code(), mismatch);
            }
        }
        CheckFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&parsed.mismatches)?);
        }
    }
    Ok(())
}

pub async fn show(args: ShowArgs, config: &StepcutConfig) -> Result<()> {
    let selected = args
        .workflow
        .as_deref()
        .map(|name| resolve_workflow(Some(name), config))
        .transpose()?;
    let parsed = load_document(&args.source, config).await?;
    let workflows = &parsed.document.workflows;

    match selected {
        Some(name) => print_workflow(name, workflows.get(name)),
        None => {
            for (name, workflow) in workflows.populated() {
                print_workflow(name, workflow);
            }
        }
    }
    Ok(())
}

fn print_workflow(name: WorkflowName, workflow: &Workflow) {
    println!("{} ({} steps)", name, workflow.steps.len());
    for (index, step) in workflow.steps.iter().enumerate() {
        let marker = if step.is_script() { "*" } else { " " };
        match step.variant().title() {
            Some(title) => println!("  {}{:>2}. {} - {}", marker, index + 1, step.key(), title),
            None => println!("  {}{:>2}. {}", marker, index + 1, step.key()),
        }
    }
}
