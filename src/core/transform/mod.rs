use crate::core::document::{WorkflowDocument, WorkflowName};
use serde::Serialize;

mod prune;

pub use prune::{prune_scripts, prune_workflow, ScriptPruneTransform, SCRIPT_STEPS_TO_DROP};

/// In-place structural edit of a parsed workflow document.
pub trait DocumentTransform {
    fn name(&self) -> &'static str;
    fn transform(&self, doc: &mut WorkflowDocument) -> TransformReport;
}

/// What a transform changed in its target workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformReport {
    pub transform: &'static str,
    pub workflow: WorkflowName,
    pub steps_before: usize,
    pub steps_after: usize,
}

impl TransformReport {
    pub fn removed(&self) -> usize {
        self.steps_before - self.steps_after
    }
}

/// Run transforms in order, returning one report per transform.
pub fn apply_transforms(
    doc: &mut WorkflowDocument,
    transforms: &[Box<dyn DocumentTransform>],
) -> Vec<TransformReport> {
    transforms
        .iter()
        .map(|transform| {
            let report = transform.transform(doc);
            tracing::info!(
                transform = report.transform,
                workflow = %report.workflow,
                removed = report.removed(),
                retained = report.steps_after,
                "applied transform"
            );
            report
        })
        .collect()
}
