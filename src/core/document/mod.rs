//! Typed model of a bitrise.yml workflow document with parse and serialize.

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

pub mod audit;
pub mod fields;
pub mod step;
pub mod workflow;

pub use audit::{audit, SchemaMismatch};
pub use fields::{EnvironmentVariable, FieldBag, FieldCatalog, Input};
pub use step::{
    BuildArchiveStep, ChangeWorkingDirectoryStep, CustomPathStep, DependencyInstallStep,
    DeployArtifactStep, ScriptStep, Step, StepKind, StepVariant, TriggerSubWorkflowStep,
};
pub use workflow::{Workflow, WorkflowName, Workflows};

pub const PARSE_SYNTAX_CODE: &str = "DOC-PARSE-001";
pub const PARSE_SHAPE_CODE: &str = "DOC-PARSE-002";
pub const SERIALIZE_CODE: &str = "DOC-SER-001";

/// Root of a workflow document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    #[serde(default, deserialize_with = "format_version")]
    pub format_version: u32,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub default_step_lib_source: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "App::is_empty"
    )]
    pub app: App,
    #[serde(default)]
    pub workflows: Workflows,
}

/// App-level block holding the shared environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub envs: Vec<EnvironmentVariable>,
}

impl App {
    pub fn is_empty(&self) -> bool {
        self.envs.is_empty()
    }
}

/// A parsed document together with the fields the model dropped.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub document: WorkflowDocument,
    pub mismatches: Vec<SchemaMismatch>,
}

/// Parse document bytes.
///
/// Syntax errors and shape errors (including steps that do not declare exactly
/// one known kind) are fatal. Unrecognized fields are dropped from the model
/// and returned as [`SchemaMismatch`] findings.
pub fn parse(bytes: &[u8]) -> Result<ParsedDocument, AppError> {
    let raw: Value = serde_yaml::from_slice(bytes).map_err(|err| {
        AppError::new(
            ErrorCategory::ParseError,
            format!("workflow document is not valid YAML: {}", err),
        )
        .with_code(PARSE_SYNTAX_CODE)
    })?;

    // An empty file is an empty document.
    if raw.is_null() {
        return Ok(ParsedDocument {
            document: WorkflowDocument::default(),
            mismatches: Vec::new(),
        });
    }
    let mismatches = audit(&raw);

    // Read from the source text, not from `raw`: plain scalars in `raw` have
    // already been resolved, so `1.10` would come back as `1.1`.
    let document: WorkflowDocument = serde_yaml::from_slice(bytes).map_err(|err| {
        AppError::new(
            ErrorCategory::ParseError,
            format!("workflow document does not match the schema: {}", err),
        )
        .with_code(PARSE_SHAPE_CODE)
        .with_suggestion("every step must be a mapping with exactly one supported step kind")
    })?;

    tracing::debug!(
        format_version = document.format_version,
        populated_workflows = document.workflows.populated().count(),
        dropped_fields = mismatches.len(),
        "parsed workflow document"
    );
    Ok(ParsedDocument {
        document,
        mismatches,
    })
}

/// Render a document back to YAML bytes.
pub fn serialize(document: &WorkflowDocument) -> Result<Vec<u8>, AppError> {
    serde_yaml::to_string(document)
        .map(String::into_bytes)
        .map_err(|err| {
            AppError::new(
                ErrorCategory::SerializationError,
                format!("failed to render workflow document: {}", err),
            )
            .with_code(SERIALIZE_CODE)
        })
}

/// Deserialize `T`, treating an explicit null as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize any YAML scalar as written in the source; null becomes empty.
pub(crate) fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(fields::scalar_text(deserializer)?.unwrap_or_default())
}

/// Accept `format_version` as an integer or a numeric string.
fn format_version<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match fields::scalar_text(deserializer)? {
        None => Ok(0),
        Some(text) => text
            .trim()
            .parse::<u32>()
            .map_err(|_| de::Error::custom(format!("invalid format_version '{}'", text))),
    }
}
