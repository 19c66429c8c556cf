use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{DiagnosticEvent, RunRecord, RunStatus, RunStore, StepStatus, StoreError};

#[derive(Default)]
struct State {
  runs: HashMap<String, RunRecord>,
  events: HashMap<String, Vec<DiagnosticEvent>>,
  steps: HashMap<String, BTreeMap<String, StepStatus>>,
}

impl State {
  fn require_run(&mut self, run_id: &str) -> Result<&mut RunRecord, StoreError> {
    self
      .runs
      .get_mut(run_id)
      .ok_or_else(|| StoreError::NotFound(run_id.to_string()))
  }
}

/// In-memory store. Every operation runs under one lock, so multi-write
/// operations are atomic with respect to other callers.
#[derive(Default)]
pub struct MemoryStore {
  state: Mutex<State>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of stored runs.
  pub async fn run_count(&self) -> usize {
    self.state.lock().await.runs.len()
  }
}

#[async_trait]
impl RunStore for MemoryStore {
  async fn create_run(&self, run: &RunRecord) -> Result<RunRecord, StoreError> {
    let mut state = self.state.lock().await;
    if state.runs.contains_key(&run.run_id) {
      return Err(StoreError::AlreadyExists(run.run_id.clone()));
    }
    state.runs.insert(run.run_id.clone(), run.clone());
    Ok(run.clone())
  }

  async fn get_run(&self, run_id: &str) -> Result<Option<RunRecord>, StoreError> {
    Ok(self.state.lock().await.runs.get(run_id).cloned())
  }

  async fn append_event(&self, run_id: &str, event: &DiagnosticEvent) -> Result<(), StoreError> {
    let mut state = self.state.lock().await;
    state.require_run(run_id)?;
    state
      .events
      .entry(run_id.to_string())
      .or_default()
      .push(event.clone());
    Ok(())
  }

  async fn mark_failed(&self, run_id: &str) -> Result<(), StoreError> {
    let mut state = self.state.lock().await;
    let run = state.require_run(run_id)?;
    run.status = Some(RunStatus::Failure);
    run.updated_at = Utc::now();
    Ok(())
  }

  async fn fail_run_with_event(
    &self,
    run_id: &str,
    event: &DiagnosticEvent,
  ) -> Result<(), StoreError> {
    let mut state = self.state.lock().await;
    let run = state.require_run(run_id)?;
    run.status = Some(RunStatus::Failure);
    run.updated_at = Utc::now();
    state
      .events
      .entry(run_id.to_string())
      .or_default()
      .push(event.clone());
    Ok(())
  }

  async fn events_for_run(&self, run_id: &str) -> Result<Vec<DiagnosticEvent>, StoreError> {
    let state = self.state.lock().await;
    Ok(state.events.get(run_id).cloned().unwrap_or_default())
  }

  async fn record_step_status(
    &self,
    run_id: &str,
    step_key: &str,
    status: StepStatus,
  ) -> Result<(), StoreError> {
    let mut state = self.state.lock().await;
    state.require_run(run_id)?;
    state
      .steps
      .entry(run_id.to_string())
      .or_default()
      .insert(step_key.to_string(), status);
    Ok(())
  }

  async fn step_statuses(&self, run_id: &str) -> Result<BTreeMap<String, StepStatus>, StoreError> {
    let state = self.state.lock().await;
    Ok(state.steps.get(run_id).cloned().unwrap_or_default())
  }
}
