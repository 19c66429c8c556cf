use runway_workflow::WorkflowError;

/// Errors that can occur during plan compilation.
///
/// These indicate an internal inconsistency between the request and the
/// workflow, not a configuration problem.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
  /// Step key not present in the workflow.
  #[error("step '{step_key}' not found in workflow '{workflow}'")]
  UnknownStep { workflow: String, step_key: String },

  /// Step key listed more than once.
  #[error("step '{0}' listed more than once")]
  DuplicateStep(String),

  /// No steps to execute.
  #[error("execution plan for workflow '{0}' has no steps")]
  Empty(String),

  /// Workflow structure error (unknown mode, invalid graph).
  #[error(transparent)]
  Workflow(#[from] WorkflowError),
}
