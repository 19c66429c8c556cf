use serde::{Deserialize, Serialize};

use runway_validator::ConfigSchemaSnapshot;
use runway_workflow::{WorkflowDefinition, WorkflowError, WorkflowSnapshot};

/// On-disk form of a workflow: the structural snapshot plus its config schema.
///
/// ```json
/// {
///   "name": "W",
///   "steps": [{ "key": "extract" }, { "key": "load" }],
///   "edges": [{ "from": "extract", "to": "load" }],
///   "modes": [{ "name": "default", "root_config_key": "W.Default" }],
///   "config_schema": { "version": 1, "types": { "W.Default": { "kind": "shape", "fields": {} } } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
  #[serde(flatten)]
  pub workflow: WorkflowSnapshot,
  #[serde(default)]
  pub config_schema: ConfigSchemaSnapshot,
}

impl WorkflowDocument {
  /// Validate and build the definition.
  pub fn into_definition(self) -> Result<WorkflowDefinition, WorkflowError> {
    WorkflowDefinition::new(self.workflow, self.config_schema)
  }
}
