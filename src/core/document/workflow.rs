use super::fields::EnvironmentVariable;
use super::step::Step;
use super::{null_as_default, scalar_string};
use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const WORKFLOW_COUNT: usize = 15;

/// The fixed set of workflow names a document can define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorkflowName {
    Test,
    TestNewCertificates,
    TestBundleId,
    TestXcodeManaged,
    TestXcodeManagedGenerateEnabled,
    TestEntitlements,
    TestWorkspace,
    TestTvos,
    TestTvosDevelopment,
    TestTvosManaged,
    TestTvosDevelopmentManaged,
    Common,
    CreateRelease,
    AuditThisStep,
    ShareThisStep,
}

impl WorkflowName {
    /// Canonical order, also used when rendering the `workflows` block.
    pub const ALL: [WorkflowName; WORKFLOW_COUNT] = [
        WorkflowName::Test,
        WorkflowName::TestNewCertificates,
        WorkflowName::TestBundleId,
        WorkflowName::TestXcodeManaged,
        WorkflowName::TestXcodeManagedGenerateEnabled,
        WorkflowName::TestEntitlements,
        WorkflowName::TestWorkspace,
        WorkflowName::TestTvos,
        WorkflowName::TestTvosDevelopment,
        WorkflowName::TestTvosManaged,
        WorkflowName::TestTvosDevelopmentManaged,
        WorkflowName::Common,
        WorkflowName::CreateRelease,
        WorkflowName::AuditThisStep,
        WorkflowName::ShareThisStep,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowName::Test => "test",
            WorkflowName::TestNewCertificates => "test_new_certificates",
            WorkflowName::TestBundleId => "test_bundle_id",
            WorkflowName::TestXcodeManaged => "test_xcode_managed",
            WorkflowName::TestXcodeManagedGenerateEnabled => "test_xcode_managed_generate_enabled",
            WorkflowName::TestEntitlements => "test_entitlements",
            WorkflowName::TestWorkspace => "test_workspace",
            WorkflowName::TestTvos => "test_tvos",
            WorkflowName::TestTvosDevelopment => "test_tvos_development",
            WorkflowName::TestTvosManaged => "test_tvos_managed",
            WorkflowName::TestTvosDevelopmentManaged => "test_tvos_development_managed",
            WorkflowName::Common => "_common",
            WorkflowName::CreateRelease => "create-release",
            WorkflowName::AuditThisStep => "audit-this-step",
            WorkflowName::ShareThisStep => "share-this-step",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for WorkflowName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowName {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        WorkflowName::ALL
            .into_iter()
            .find(|name| name.as_str() == value)
            .ok_or_else(|| {
                let known: Vec<&str> = WorkflowName::ALL.iter().map(|name| name.as_str()).collect();
                format!(
                    "unknown workflow '{}'; supported workflows are {}",
                    value,
                    known.join(", ")
                )
            })
    }
}

impl Serialize for WorkflowName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One named workflow. Every field is optional and omitted when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub envs: Vec<EnvironmentVariable>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub before_run: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub steps: Vec<Step>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub after_run: Vec<String>,
}

impl Workflow {
    /// Recognized top-level fields of a workflow body.
    pub const FIELDS: &'static [&'static str] = &[
        "title",
        "description",
        "envs",
        "before_run",
        "steps",
        "after_run",
    ];

    /// True when no field is populated; such a workflow renders as `{}`.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.description.is_empty()
            && self.envs.is_empty()
            && self.before_run.is_empty()
            && self.steps.is_empty()
            && self.after_run.is_empty()
    }
}

/// All known workflows, always fully populated in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflows {
    entries: [Workflow; WORKFLOW_COUNT],
}

impl Default for Workflows {
    fn default() -> Self {
        Self {
            entries: std::array::from_fn(|_| Workflow::default()),
        }
    }
}

impl Workflows {
    pub fn get(&self, name: WorkflowName) -> &Workflow {
        &self.entries[name.index()]
    }

    pub fn get_mut(&mut self, name: WorkflowName) -> &mut Workflow {
        &mut self.entries[name.index()]
    }

    pub fn set(&mut self, name: WorkflowName, workflow: Workflow) {
        self.entries[name.index()] = workflow;
    }

    pub fn iter(&self) -> impl Iterator<Item = (WorkflowName, &Workflow)> {
        WorkflowName::ALL.into_iter().zip(self.entries.iter())
    }

    /// Workflows that carry at least one populated field.
    pub fn populated(&self) -> impl Iterator<Item = (WorkflowName, &Workflow)> {
        self.iter().filter(|(_, workflow)| !workflow.is_empty())
    }
}

impl Serialize for Workflows {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, workflow) in self.iter() {
            map.serialize_entry(&name, workflow)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Workflows {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<KnownWorkflows>::deserialize(deserializer)?
            .map(|KnownWorkflows(workflows)| workflows)
            .unwrap_or_default())
    }
}

/// The `workflows` mapping once it is known not to be null.
struct KnownWorkflows(Workflows);

impl<'de> Deserialize<'de> for KnownWorkflows {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(WorkflowsVisitor)
    }
}

struct WorkflowsVisitor;

impl<'de> Visitor<'de> for WorkflowsVisitor {
    type Value = KnownWorkflows;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of workflow names to workflows")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut workflows = Workflows::default();
        while let Some(key) = access.next_key::<String>()? {
            let Ok(name) = key.parse::<WorkflowName>() else {
                // Reported by the schema audit; the typed model drops it.
                tracing::debug!(workflow = %key, "dropping unknown workflow");
                access.next_value::<IgnoredAny>()?;
                continue;
            };
            if let Some(workflow) = access.next_value::<Option<Workflow>>()? {
                workflows.set(name, workflow);
            }
        }
        Ok(KnownWorkflows(workflows))
    }
}
