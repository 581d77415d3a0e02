//! Step entries and the tagged union over the known step kinds.
//!
//! In the document a step is a single-key mapping: the key names the kind
//! (optionally pinned with `@<version>`, or `path::<reference>` for local
//! steps) and the value holds that kind's body. The model turns this
//! convention into a sum type so a step can never carry zero or several kinds.

use super::fields::Input;
use super::{null_as_default, scalar_string};
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

const PATH_PREFIX: &str = "path::";

/// Discriminant of [`StepVariant`], used for reporting and key parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Script,
    TriggerSubWorkflow,
    ChangeWorkingDirectory,
    DependencyInstall,
    CustomPath,
    BuildArchive,
    DeployArtifact,
}

impl StepKind {
    pub const ALL: [StepKind; 7] = [
        StepKind::Script,
        StepKind::TriggerSubWorkflow,
        StepKind::ChangeWorkingDirectory,
        StepKind::DependencyInstall,
        StepKind::CustomPath,
        StepKind::BuildArchive,
        StepKind::DeployArtifact,
    ];

    /// Step id as written in the document. Custom path steps use a prefix instead.
    pub fn id(self) -> &'static str {
        match self {
            StepKind::Script => "script",
            StepKind::TriggerSubWorkflow => "trigger-bitrise-workflow",
            StepKind::ChangeWorkingDirectory => "change-workdir",
            StepKind::DependencyInstall => "cocoapods-install",
            StepKind::CustomPath => "path::",
            StepKind::BuildArchive => "xcode-archive",
            StepKind::DeployArtifact => "deploy-to-bitrise-io",
        }
    }

    /// Body fields recognized for this kind.
    pub fn body_fields(self) -> &'static [&'static str] {
        match self {
            StepKind::Script
            | StepKind::ChangeWorkingDirectory
            | StepKind::BuildArchive => &["title", "inputs"],
            StepKind::TriggerSubWorkflow => &["run_if", "inputs"],
            StepKind::DependencyInstall => &["run_if", "title"],
            StepKind::CustomPath => &["title", "run_if", "inputs"],
            StepKind::DeployArtifact => &["inputs"],
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Parsed form of a step key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepKey {
    pub kind: StepKind,
    /// `@<version>` suffix, if pinned.
    pub version: Option<String>,
    /// Reference following `path::`, only for custom path steps.
    pub reference: Option<String>,
}

impl StepKey {
    pub fn parse(key: &str) -> Result<Self, String> {
        if let Some(reference) = key.strip_prefix(PATH_PREFIX) {
            if reference.is_empty() {
                return Err(format!("step key '{}' has an empty path reference", key));
            }
            return Ok(StepKey {
                kind: StepKind::CustomPath,
                version: None,
                reference: Some(reference.to_string()),
            });
        }

        let (id, version) = match key.split_once('@') {
            Some((id, version)) if !version.is_empty() => (id, Some(version.to_string())),
            Some(_) => return Err(format!("step key '{}' has an empty version", key)),
            None => (key, None),
        };
        let kind = StepKind::ALL
            .into_iter()
            .filter(|kind| *kind != StepKind::CustomPath)
            .find(|kind| kind.id() == id)
            .ok_or_else(|| format!("unsupported step kind '{}'", id))?;
        Ok(StepKey {
            kind,
            version,
            reference: None,
        })
    }
}

/// Inline shell script step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub inputs: Vec<Input>,
}

/// Step that triggers another workflow by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSubWorkflowStep {
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub run_if: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub inputs: Vec<Input>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeWorkingDirectoryStep {
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub inputs: Vec<Input>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyInstallStep {
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub run_if: String,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub title: String,
}

/// Step definition referenced from the local filesystem.
///
/// `run_if` stays optional so an explicit `false` survives the round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPathStep {
    #[serde(skip)]
    pub reference: String,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_if: Option<bool>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub inputs: Vec<Input>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildArchiveStep {
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub inputs: Vec<Input>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployArtifactStep {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub inputs: Vec<Input>,
}

/// One populated step kind together with its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepVariant {
    Script(ScriptStep),
    TriggerSubWorkflow(TriggerSubWorkflowStep),
    ChangeWorkingDirectory(ChangeWorkingDirectoryStep),
    DependencyInstall(DependencyInstallStep),
    CustomPath(CustomPathStep),
    BuildArchive(BuildArchiveStep),
    DeployArtifact(DeployArtifactStep),
}

impl StepVariant {
    pub fn kind(&self) -> StepKind {
        match self {
            StepVariant::Script(_) => StepKind::Script,
            StepVariant::TriggerSubWorkflow(_) => StepKind::TriggerSubWorkflow,
            StepVariant::ChangeWorkingDirectory(_) => StepKind::ChangeWorkingDirectory,
            StepVariant::DependencyInstall(_) => StepKind::DependencyInstall,
            StepVariant::CustomPath(_) => StepKind::CustomPath,
            StepVariant::BuildArchive(_) => StepKind::BuildArchive,
            StepVariant::DeployArtifact(_) => StepKind::DeployArtifact,
        }
    }

    /// Title of the step, if its kind carries one and it is set.
    pub fn title(&self) -> Option<&str> {
        let title = match self {
            StepVariant::Script(step) => &step.title,
            StepVariant::ChangeWorkingDirectory(step) => &step.title,
            StepVariant::DependencyInstall(step) => &step.title,
            StepVariant::CustomPath(step) => &step.title,
            StepVariant::BuildArchive(step) => &step.title,
            StepVariant::TriggerSubWorkflow(_) | StepVariant::DeployArtifact(_) => return None,
        };
        (!title.is_empty()).then_some(title.as_str())
    }
}

/// A positional entry in a workflow's step list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    version: Option<String>,
    variant: StepVariant,
}

impl Step {
    pub fn new(variant: StepVariant) -> Self {
        Self {
            version: None,
            variant,
        }
    }

    /// Pin the step to a version, rendered as `<kind>@<version>`.
    ///
    /// Custom path steps have no version; the value is ignored for them.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        if self.kind() != StepKind::CustomPath {
            self.version = Some(version.into());
        }
        self
    }

    pub fn script(title: impl Into<String>) -> Self {
        Self::new(StepVariant::Script(ScriptStep {
            title: title.into(),
            inputs: Vec::new(),
        }))
    }

    pub fn kind(&self) -> StepKind {
        self.variant.kind()
    }

    pub fn is_script(&self) -> bool {
        matches!(self.variant, StepVariant::Script(_))
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn variant(&self) -> &StepVariant {
        &self.variant
    }

    pub fn variant_mut(&mut self) -> &mut StepVariant {
        &mut self.variant
    }

    /// Key under which the step is written in the document.
    pub fn key(&self) -> String {
        match (&self.variant, &self.version) {
            (StepVariant::CustomPath(step), _) => format!("{}{}", PATH_PREFIX, step.reference),
            (variant, Some(version)) => format!("{}@{}", variant.kind().id(), version),
            (variant, None) => variant.kind().id().to_string(),
        }
    }
}

impl From<StepVariant> for Step {
    fn from(variant: StepVariant) -> Self {
        Step::new(variant)
    }
}

impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let key = self.key();
        let mut map = serializer.serialize_map(Some(1))?;
        match &self.variant {
            StepVariant::Script(body) => map.serialize_entry(&key, body)?,
            StepVariant::TriggerSubWorkflow(body) => map.serialize_entry(&key, body)?,
            StepVariant::ChangeWorkingDirectory(body) => map.serialize_entry(&key, body)?,
            StepVariant::DependencyInstall(body) => map.serialize_entry(&key, body)?,
            StepVariant::CustomPath(body) => map.serialize_entry(&key, body)?,
            StepVariant::BuildArchive(body) => map.serialize_entry(&key, body)?,
            StepVariant::DeployArtifact(body) => map.serialize_entry(&key, body)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StepVisitor)
    }
}

struct StepVisitor;

impl<'de> Visitor<'de> for StepVisitor {
    type Value = Step;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping with exactly one step kind")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let Some(key) = access.next_key::<String>()? else {
            return Err(de::Error::custom("step must declare exactly one kind, found none"));
        };
        let parsed = StepKey::parse(&key).map_err(de::Error::custom)?;
        let variant = match parsed.kind {
            StepKind::Script => StepVariant::Script(next_body(&mut access)?),
            StepKind::TriggerSubWorkflow => {
                StepVariant::TriggerSubWorkflow(next_body(&mut access)?)
            }
            StepKind::ChangeWorkingDirectory => {
                StepVariant::ChangeWorkingDirectory(next_body(&mut access)?)
            }
            StepKind::DependencyInstall => {
                StepVariant::DependencyInstall(next_body(&mut access)?)
            }
            StepKind::CustomPath => {
                let mut step: CustomPathStep = next_body(&mut access)?;
                step.reference = parsed.reference.clone().unwrap_or_default();
                StepVariant::CustomPath(step)
            }
            StepKind::BuildArchive => StepVariant::BuildArchive(next_body(&mut access)?),
            StepKind::DeployArtifact => StepVariant::DeployArtifact(next_body(&mut access)?),
        };

        let mut keys = vec![key];
        while let Some(extra) = access.next_key::<String>()? {
            access.next_value::<IgnoredAny>()?;
            keys.push(extra);
        }
        if keys.len() > 1 {
            return Err(de::Error::custom(format!(
                "step must declare exactly one kind, found {}: {}",
                keys.len(),
                keys.join(", ")
            )));
        }

        Ok(Step {
            version: parsed.version,
            variant,
        })
    }
}

/// Read a step body; `- script:` with no body is a step with every field unset.
fn next_body<'de, A, T>(access: &mut A) -> Result<T, A::Error>
where
    A: MapAccess<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(access.next_value::<Option<T>>()?.unwrap_or_default())
}
