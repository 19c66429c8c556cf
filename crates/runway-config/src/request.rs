use serde::{Deserialize, Serialize};

use crate::tags::{RESUME_RETRY_TAG, Tags};

/// Selects a workflow, optionally narrowed to a subset of its steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSelector {
  /// Workflow name, e.g. "nightly_ingest"
  pub name: String,

  /// Structural subset of step keys. The selected workflow is derived from
  /// the full one and only contains these steps.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub step_subset: Option<Vec<String>>,
}

impl WorkflowSelector {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      step_subset: None,
    }
  }
}

/// Caller-supplied identity and lineage for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetadata {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub run_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub root_run_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent_run_id: Option<String>,
  #[serde(default)]
  pub tags: Tags,
}

impl ExecutionMetadata {
  /// Whether the request asks to resume/retry its parent run.
  pub fn is_resume_retry(&self) -> bool {
    self
      .tags
      .get(RESUME_RETRY_TAG)
      .is_some_and(|value| value == "true")
  }
}

/// A client-submitted request to execute a workflow.
///
/// Immutable once built. The `config` document is untrusted until it has
/// been validated against the workflow's schema for `mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
  pub selector: WorkflowSelector,
  pub mode: String,
  #[serde(default)]
  pub config: serde_json::Value,
  /// Explicit steps to execute. When absent, the steps are chosen by the
  /// step selection rules (full run or resume/retry).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub step_keys: Option<Vec<String>>,
  #[serde(default)]
  pub metadata: ExecutionMetadata,
}

impl ExecutionRequest {
  pub fn new(selector: WorkflowSelector, mode: impl Into<String>, config: serde_json::Value) -> Self {
    Self {
      selector,
      mode: mode.into(),
      config,
      step_keys: None,
      metadata: ExecutionMetadata::default(),
    }
  }
}
