use thiserror::Error;

use runway_workflow::WorkflowError;

/// Errors that can occur during workflow resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// No workflow with this name.
  #[error("workflow not found: {name}")]
  WorkflowNotFound { name: String },

  /// The workflow exists but is structurally invalid, or the step subset
  /// names steps it does not have.
  #[error(transparent)]
  Workflow(#[from] WorkflowError),

  /// Workflow document could not be parsed.
  #[error("failed to parse workflow document '{name}': {source}")]
  Parse {
    name: String,
    #[source]
    source: serde_json::Error,
  },

  /// Filesystem error while reading a workflow document.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
