//! Step selection: which steps of a workflow a new run executes.

use std::collections::{BTreeMap, HashSet};

use runway_config::ExecutionRequest;
use runway_store::{RunStore, StepStatus};
use runway_workflow::{Graph, WorkflowDefinition};
use tracing::debug;

use crate::error::{LifecycleError, SelectionError};

/// How the steps of a run are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepSelection {
  /// Every step of the workflow.
  Full,
  /// Exactly these steps.
  Explicit(Vec<String>),
  /// Whatever the parent run left unfinished, plus everything downstream of it.
  ResumeRetry { parent_run_id: String },
}

impl StepSelection {
  /// Classify a request.
  ///
  /// Explicit step keys take precedence over the resume/retry tag. An empty
  /// explicit list selects the full workflow.
  pub fn for_request(request: &ExecutionRequest) -> Result<Self, SelectionError> {
    if let Some(keys) = request.step_keys.as_ref().filter(|keys| !keys.is_empty()) {
      return Ok(StepSelection::Explicit(keys.clone()));
    }

    if request.metadata.is_resume_retry() {
      let parent_run_id = request
        .metadata
        .parent_run_id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or(SelectionError::MissingParentRun)?;
      return Ok(StepSelection::ResumeRetry { parent_run_id });
    }

    Ok(StepSelection::Full)
  }
}

/// Compute the ordered step keys to execute.
///
/// The result is always in the workflow's topological order and contains no
/// duplicates, so identical inputs give identical output.
pub async fn resolve_step_keys<S>(
  store: &S,
  workflow: &WorkflowDefinition,
  selection: &StepSelection,
) -> Result<Vec<String>, LifecycleError>
where
  S: RunStore + ?Sized,
{
  let graph = workflow.graph()?;
  let order = graph.topological_order()?;

  let keys = match selection {
    StepSelection::Full => order,
    StepSelection::Explicit(keys) => {
      let mut requested = HashSet::with_capacity(keys.len());
      for key in keys {
        if !graph.contains(key) {
          return Err(
            SelectionError::UnknownStep {
              workflow: workflow.name().to_string(),
              step_key: key.clone(),
            }
            .into(),
          );
        }
        requested.insert(key.as_str());
      }
      order
        .iter()
        .filter(|key| requested.contains(key.as_str()))
        .cloned()
        .collect()
    }
    StepSelection::ResumeRetry { parent_run_id } => {
      let parent = store
        .get_run(parent_run_id)
        .await?
        .ok_or_else(|| SelectionError::ParentRunNotFound(parent_run_id.clone()))?;
      let statuses = store.step_statuses(parent_run_id).await?;

      let candidates = if parent.step_keys_to_execute.is_empty() {
        order.clone()
      } else {
        parent.step_keys_to_execute
      };
      let keys = retry_step_keys(&graph, &order, &candidates, &statuses);
      if keys.is_empty() {
        return Err(SelectionError::NothingToRetry(parent_run_id.clone()).into());
      }
      debug!(
        workflow = workflow.name(),
        parent_run_id = %parent_run_id,
        steps = keys.len(),
        "selected steps to retry"
      );
      keys
    }
  };

  Ok(keys)
}

/// Steps of `candidates` that did not succeed, plus the candidates downstream
/// of them, in `order`.
///
/// Candidates the workflow no longer has are ignored.
fn retry_step_keys(
  graph: &Graph,
  order: &[String],
  candidates: &[String],
  statuses: &BTreeMap<String, StepStatus>,
) -> Vec<String> {
  let candidates: HashSet<&str> = candidates
    .iter()
    .map(String::as_str)
    .filter(|key| graph.contains(key))
    .collect();

  let unfinished = candidates
    .iter()
    .copied()
    .filter(|key| statuses.get(*key) != Some(&StepStatus::Success));
  let selected = graph.downstream_closure(unfinished);

  order
    .iter()
    .filter(|key| selected.contains(*key) && candidates.contains(key.as_str()))
    .cloned()
    .collect()
}
