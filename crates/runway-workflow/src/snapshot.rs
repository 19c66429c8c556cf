use serde::{Deserialize, Serialize};

use runway_config::Tags;

/// One unit of work in a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSnapshot {
  pub key: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Tags::is_empty")]
  pub tags: Tags,
}

impl StepSnapshot {
  pub fn new(key: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      description: None,
      tags: Tags::new(),
    }
  }
}

/// A dependency: `to` consumes the output of `from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
  pub from: String,
  pub to: String,
}

impl Edge {
  pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
    Self {
      from: from.into(),
      to: to.into(),
    }
  }
}

/// A named execution profile and the config type its documents must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeSnapshot {
  pub name: String,
  pub root_config_key: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

impl ModeSnapshot {
  pub fn new(name: impl Into<String>, root_config_key: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      root_config_key: root_config_key.into(),
      description: None,
    }
  }
}

/// Structural snapshot of a workflow: steps in declaration order, edges, modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub steps: Vec<StepSnapshot>,
  #[serde(default)]
  pub edges: Vec<Edge>,
  pub modes: Vec<ModeSnapshot>,
  #[serde(default)]
  pub tags: Tags,
}

impl WorkflowSnapshot {
  /// Content id: blake3 over the JSON encoding.
  pub fn snapshot_id(&self) -> String {
    // Serialization cannot fail: every map in the snapshot is string-keyed.
    let encoded = serde_json::to_vec(self).unwrap_or_default();
    blake3::hash(&encoded).to_hex().to_string()
  }

  pub fn step(&self, key: &str) -> Option<&StepSnapshot> {
    self.steps.iter().find(|step| step.key == key)
  }

  pub fn mode(&self, name: &str) -> Option<&ModeSnapshot> {
    self.modes.iter().find(|mode| mode.name == name)
  }

  /// Step keys in declaration order.
  pub fn step_keys(&self) -> Vec<&str> {
    self.steps.iter().map(|step| step.key.as_str()).collect()
  }
}
