use serde::{Deserialize, Serialize};

/// One step of a compiled plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedStep {
  pub key: String,
  /// Upstream steps that also execute in this plan.
  pub upstream: Vec<String>,
  /// Upstream steps outside this plan. Their outputs come from a prior run.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub external_upstream: Vec<String>,
  /// The step's slice of the run config (`steps.<key>`), if any.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub config: Option<serde_json::Value>,
}

/// Immutable execution plan for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlanSnapshot {
  pub workflow_name: String,
  pub workflow_snapshot_id: String,
  pub mode: String,
  /// Steps in execution order.
  pub steps: Vec<PlannedStep>,
}

impl ExecutionPlanSnapshot {
  /// Step keys in execution order.
  pub fn step_keys(&self) -> Vec<&str> {
    self.steps.iter().map(|step| step.key.as_str()).collect()
  }

  pub fn step(&self, key: &str) -> Option<&PlannedStep> {
    self.steps.iter().find(|step| step.key == key)
  }

  /// Content id: blake3 over the JSON encoding.
  pub fn snapshot_id(&self) -> String {
    // Serialization cannot fail: the plan only holds strings and JSON values.
    let encoded = serde_json::to_vec(self).unwrap_or_default();
    blake3::hash(&encoded).to_hex().to_string()
  }
}
