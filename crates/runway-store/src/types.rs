use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use runway_config::Tags;
use runway_plan::ExecutionPlanSnapshot;
use runway_workflow::WorkflowSnapshot;

/// Status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum RunStatus {
  NotStarted,
  /// Tracked by an external system rather than launched by us.
  Managed,
  Started,
  Success,
  Failure,
}

impl RunStatus {
  pub fn is_finished(&self) -> bool {
    matches!(self, RunStatus::Success | RunStatus::Failure)
  }
}

/// Outcome of one step in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum StepStatus {
  Success,
  Failure,
  Skipped,
}

/// A run as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
  pub run_id: String,
  pub workflow_name: String,
  pub step_subset: Option<Vec<String>>,
  /// The configuration document as submitted.
  pub config: serde_json::Value,
  pub mode: String,
  pub step_keys_to_execute: Vec<String>,
  /// `None` until a later stage decides.
  pub status: Option<RunStatus>,
  pub tags: Tags,
  pub root_run_id: Option<String>,
  pub parent_run_id: Option<String>,
  pub workflow_snapshot: WorkflowSnapshot,
  /// Present only if the config passed validation when the run was created.
  pub execution_plan_snapshot: Option<ExecutionPlanSnapshot>,
  pub parent_workflow_snapshot: Option<WorkflowSnapshot>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl RunRecord {
  /// Whether an executor may start this run.
  pub fn is_executable(&self) -> bool {
    self.execution_plan_snapshot.is_some() && self.status != Some(RunStatus::Failure)
  }
}

/// Generate a fresh run id.
pub fn make_new_run_id() -> String {
  uuid::Uuid::new_v4().to_string()
}
