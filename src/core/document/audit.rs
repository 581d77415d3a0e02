//! Schema audit over the raw YAML tree.
//!
//! The typed model silently drops fields it does not know. The audit walks the
//! untyped tree before conversion and reports every such field so callers can
//! surface them. Structural problems (a step with two kinds, a scalar where a
//! mapping belongs) are left to the typed parse, which rejects them.

use super::fields::{EnvironmentFields, FieldCatalog, InputFields};
use super::step::{StepKey, StepKind};
use super::workflow::{Workflow, WorkflowName};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::fmt;

pub const SCHEMA_MISMATCH_CODE: &str = "DOC-SCHEMA-001";

const ROOT_FIELDS: &[&str] = &[
    "format_version",
    "default_step_lib_source",
    "app",
    "workflows",
];
const APP_FIELDS: &[&str] = &["envs"];

/// A field present in the source that the schema does not recognize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaMismatch {
    /// Dotted path of the record holding the field, e.g. `workflows._common.steps[1].script`.
    pub location: String,
    pub field: String,
}

impl SchemaMismatch {
    pub fn code(&self) -> &'static str {
        SCHEMA_MISMATCH_CODE
    }

    /// Warning-severity error value describing this mismatch.
    pub fn to_error(&self) -> AppError {
        let mut error = AppError::new(ErrorCategory::SchemaMismatch, self.to_string())
            .with_code(SCHEMA_MISMATCH_CODE);
        error.add_context("location", &self.location);
        error
    }
}

impl fmt::Display for SchemaMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "unrecognized field '{}' at document root", self.field)
        } else {
            write!(
                f,
                "unrecognized field '{}' at {}",
                self.field, self.location
            )
        }
    }
}

/// Collect every unrecognized field in a raw document tree.
pub fn audit(raw: &Value) -> Vec<SchemaMismatch> {
    let mut out = Vec::new();
    let Some(root) = raw.as_mapping() else {
        return out;
    };

    for (key, value) in root {
        let Some(key) = key.as_str() else { continue };
        match key {
            "app" => audit_app(value, &mut out),
            "workflows" => audit_workflows(value, &mut out),
            _ if ROOT_FIELDS.contains(&key) => {}
            _ => push(&mut out, "", key),
        }
    }
    out
}

fn audit_app(value: &Value, out: &mut Vec<SchemaMismatch>) {
    let Some(app) = value.as_mapping() else { return };
    audit_fields(app, "app", APP_FIELDS, out);
    if let Some(envs) = app.get("envs") {
        audit_bags::<EnvironmentFields>(envs, "app.envs", out);
    }
}

fn audit_workflows(value: &Value, out: &mut Vec<SchemaMismatch>) {
    let Some(workflows) = value.as_mapping() else { return };
    for (name, body) in workflows {
        let Some(name) = name.as_str() else { continue };
        if name.parse::<WorkflowName>().is_err() {
            push(out, "workflows", name);
            continue;
        }
        let location = format!("workflows.{}", name);
        let Some(body) = body.as_mapping() else { continue };
        audit_fields(body, &location, Workflow::FIELDS, out);
        if let Some(envs) = body.get("envs") {
            audit_bags::<EnvironmentFields>(envs, &format!("{}.envs", location), out);
        }
        if let Some(Value::Sequence(steps)) = body.get("steps") {
            for (index, step) in steps.iter().enumerate() {
                audit_step(step, &format!("{}.steps[{}]", location, index), out);
            }
        }
    }
}

fn audit_step(step: &Value, location: &str, out: &mut Vec<SchemaMismatch>) {
    let Some(entries) = step.as_mapping() else { return };
    if entries.len() != 1 {
        return;
    }
    let Some((key, body)) = entries.iter().next() else { return };
    let Some(key) = key.as_str() else { return };
    let Ok(parsed) = StepKey::parse(key) else { return };
    let Some(body) = body.as_mapping() else { return };

    let location = format!("{}.{}", location, key);
    audit_fields(body, &location, parsed.kind.body_fields(), out);
    if parsed.kind != StepKind::DependencyInstall {
        if let Some(inputs) = body.get("inputs") {
            audit_bags::<InputFields>(inputs, &format!("{}.inputs", location), out);
        }
    }
}

fn audit_bags<C: FieldCatalog>(value: &Value, location: &str, out: &mut Vec<SchemaMismatch>) {
    let Some(records) = value.as_sequence() else { return };
    for (index, record) in records.iter().enumerate() {
        if let Some(record) = record.as_mapping() {
            audit_fields(record, &format!("{}[{}]", location, index), C::NAMES, out);
        }
    }
}

fn audit_fields(
    record: &Mapping,
    location: &str,
    known: &[&str],
    out: &mut Vec<SchemaMismatch>,
) {
    for key in record.keys() {
        match key.as_str() {
            Some(name) if known.contains(&name) => {}
            Some(name) => push(out, location, name),
            None => push(out, location, &render_key(key)),
        }
    }
}

fn render_key(key: &Value) -> String {
    serde_yaml::to_string(key)
        .map(|text| text.trim_end().to_string())
        .unwrap_or_else(|_| "<unprintable>".to_string())
}

fn push(out: &mut Vec<SchemaMismatch>, location: &str, field: &str) {
    out.push(SchemaMismatch {
        location: location.to_string(),
        field: field.to_string(),
    });
}
