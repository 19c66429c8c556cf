use runway_store::RunRecord;
use runway_validator::ValidationError;
use runway_workflow::WorkflowDefinition;

/// A stored run whose configuration passed re-validation, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionInfo {
  pub workflow: WorkflowDefinition,
  pub run: RunRecord,
}

/// A stored run whose configuration no longer passes validation.
///
/// By the time this is returned the run has been marked failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationInvalid {
  pub workflow: WorkflowDefinition,
  pub errors: Vec<ValidationError>,
}

/// Result of looking up a previously created run for execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionInfoOutcome {
  Ready(ExecutionInfo),
  /// No run with this id ever existed.
  RunNotFound { run_id: String },
  InvalidConfig(ConfigValidationInvalid),
}

impl ExecutionInfoOutcome {
  pub fn is_ready(&self) -> bool {
    matches!(self, ExecutionInfoOutcome::Ready(_))
  }

  pub fn into_ready(self) -> Option<ExecutionInfo> {
    match self {
      ExecutionInfoOutcome::Ready(info) => Some(info),
      _ => None,
    }
  }
}
