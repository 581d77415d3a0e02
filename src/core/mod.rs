pub mod config;
pub mod document;
pub mod error;
pub mod transform;
pub mod types;

pub use config::{ConfigLoader, ConfigValidator, StepcutConfig};
pub use document::{parse, serialize, ParsedDocument, WorkflowDocument, WorkflowName};
pub use error::AppError;
pub use transform::{prune_workflow, DocumentTransform, TransformReport};
pub use types::*;
