use runway_validator::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("workflow '{0}' has no steps")]
  NoSteps(String),

  #[error("step not found: {0}")]
  StepNotFound(String),

  #[error("duplicate step key: {0}")]
  DuplicateStepKey(String),

  #[error("edge references unknown step: from={from}, to={to}")]
  InvalidEdge { from: String, to: String },

  #[error("cycle detected in workflow graph")]
  CycleDetected,

  #[error("duplicate mode: {0}")]
  DuplicateMode(String),

  #[error("mode '{mode}' not found in workflow '{workflow}'")]
  ModeNotFound { workflow: String, mode: String },

  #[error("mode '{mode}' has root config type '{type_key}' which the schema does not define")]
  UnknownRootType { mode: String, type_key: String },

  #[error("step subset must name at least one step")]
  EmptySubset,

  #[error("invalid config schema: {0}")]
  Schema(#[from] SchemaError),
}
