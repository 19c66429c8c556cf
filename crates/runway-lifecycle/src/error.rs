use runway_plan::PlanError;
use runway_resolver::ResolveError;
use runway_store::StoreError;
use runway_validator::ValidationError;
use runway_workflow::WorkflowError;

/// Errors computing the steps a run should execute.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
  /// Explicitly requested step does not exist in the workflow.
  #[error("step '{step_key}' not found in workflow '{workflow}'")]
  UnknownStep { workflow: String, step_key: String },

  /// Resume/retry was requested without naming the run to resume.
  #[error("resume/retry requested without a parent run id")]
  MissingParentRun,

  /// The run to resume does not exist.
  #[error("parent run not found: {0}")]
  ParentRunNotFound(String),

  /// Every step of the parent run already succeeded.
  #[error("parent run '{0}' has no steps left to retry")]
  NothingToRetry(String),
}

/// Errors from the run lifecycle.
///
/// Only `InvalidConfig` is an expected, user-facing condition. Everything
/// else indicates an internal inconsistency and is fatal to the request.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
  /// Configuration rejected on the validated creation path. Nothing was persisted.
  #[error("invalid config for workflow '{workflow}' in mode '{mode}' ({} error(s))", .errors.len())]
  InvalidConfig {
    workflow: String,
    mode: String,
    errors: Vec<ValidationError>,
  },

  #[error(transparent)]
  Resolve(#[from] ResolveError),

  #[error(transparent)]
  Workflow(#[from] WorkflowError),

  #[error(transparent)]
  Selection(#[from] SelectionError),

  #[error("plan compilation failed: {0}")]
  Plan(#[from] PlanError),

  #[error("store error: {0}")]
  Store(#[from] StoreError),
}
