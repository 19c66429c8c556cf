use std::collections::HashSet;

use runway_workflow::WorkflowDefinition;
use tracing::debug;

use crate::error::PlanError;
use crate::snapshot::{ExecutionPlanSnapshot, PlannedStep};

/// Compiles execution plans.
pub trait PlanCompiler: Send + Sync {
  /// Compile the plan for `step_keys` of `workflow` under `mode`.
  ///
  /// `config` must already have passed validation.
  fn compile(
    &self,
    workflow: &WorkflowDefinition,
    mode: &str,
    config: &serde_json::Value,
    step_keys: &[String],
  ) -> Result<ExecutionPlanSnapshot, PlanError>;
}

/// Default compiler: orders the requested steps by the workflow's
/// topological order and records their dependencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPlanCompiler;

impl StandardPlanCompiler {
  pub fn new() -> Self {
    Self
  }

  fn check_step_keys(
    workflow: &WorkflowDefinition,
    step_keys: &[String],
  ) -> Result<HashSet<String>, PlanError> {
    if step_keys.is_empty() {
      return Err(PlanError::Empty(workflow.name().to_string()));
    }

    let mut selected = HashSet::with_capacity(step_keys.len());
    for key in step_keys {
      if !workflow.has_step(key) {
        return Err(PlanError::UnknownStep {
          workflow: workflow.name().to_string(),
          step_key: key.clone(),
        });
      }
      if !selected.insert(key.clone()) {
        return Err(PlanError::DuplicateStep(key.clone()));
      }
    }
    Ok(selected)
  }
}

impl PlanCompiler for StandardPlanCompiler {
  fn compile(
    &self,
    workflow: &WorkflowDefinition,
    mode: &str,
    config: &serde_json::Value,
    step_keys: &[String],
  ) -> Result<ExecutionPlanSnapshot, PlanError> {
    workflow.root_config_key_for_mode(mode)?;
    let selected = Self::check_step_keys(workflow, step_keys)?;

    let graph = workflow.graph()?;
    let steps: Vec<PlannedStep> = graph
      .topological_order()?
      .into_iter()
      .filter(|key| selected.contains(key))
      .map(|key| {
        let (upstream, external_upstream): (Vec<String>, Vec<String>) = graph
          .upstream(&key)
          .iter()
          .cloned()
          .partition(|dep| selected.contains(dep));
        let step_config = config.get("steps").and_then(|steps| steps.get(&key)).cloned();

        PlannedStep {
          key,
          upstream,
          external_upstream,
          config: step_config,
        }
      })
      .collect();

    debug!(
      workflow = workflow.name(),
      mode,
      steps = steps.len(),
      "compiled execution plan"
    );

    Ok(ExecutionPlanSnapshot {
      workflow_name: workflow.name().to_string(),
      workflow_snapshot_id: workflow.snapshot().snapshot_id(),
      mode: mode.to_string(),
      steps,
    })
  }
}
