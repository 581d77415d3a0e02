use super::{DocumentTransform, TransformReport};
use crate::core::document::{Step, WorkflowDocument, WorkflowName};

/// Number of leading inline-script steps removed from the target list.
pub const SCRIPT_STEPS_TO_DROP: usize = 2;

/// Drop the first two `script` steps of a step list.
///
/// Later scripts and every other step kind keep their relative order.
pub fn prune_scripts(steps: Vec<Step>) -> Vec<Step> {
    let mut scripts_seen = 0;
    steps
        .into_iter()
        .filter(|step| {
            if !step.is_script() {
                return true;
            }
            scripts_seen += 1;
            scripts_seen > SCRIPT_STEPS_TO_DROP
        })
        .collect()
}

/// Apply [`prune_scripts`] to the steps of one workflow of the document.
pub fn prune_workflow(doc: &mut WorkflowDocument, target: WorkflowName) -> TransformReport {
    ScriptPruneTransform::new(target).transform(doc)
}

/// Transform form of [`prune_scripts`] bound to a target workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptPruneTransform {
    target: WorkflowName,
}

impl ScriptPruneTransform {
    pub fn new(target: WorkflowName) -> Self {
        Self { target }
    }

    pub fn target(&self) -> WorkflowName {
        self.target
    }
}

impl DocumentTransform for ScriptPruneTransform {
    fn name(&self) -> &'static str {
        "ScriptPruneTransform"
    }

    fn transform(&self, doc: &mut WorkflowDocument) -> TransformReport {
        let workflow = doc.workflows.get_mut(self.target);
        let steps = std::mem::take(&mut workflow.steps);
        let steps_before = steps.len();
        workflow.steps = prune_scripts(steps);
        TransformReport {
            transform: self.name(),
            workflow: self.target,
            steps_before,
            steps_after: workflow.steps.len(),
        }
    }
}
