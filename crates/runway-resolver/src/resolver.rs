use async_trait::async_trait;

use runway_workflow::WorkflowDefinition;

use crate::error::ResolveError;

/// Resolver turns a workflow name (and optional step subset) into a
/// workflow definition.
#[async_trait]
pub trait WorkflowResolver: Send + Sync {
  /// Resolve a workflow by name.
  ///
  /// With a `step_subset`, the result is the derived subset workflow whose
  /// parent snapshot is the full workflow.
  async fn resolve(
    &self,
    name: &str,
    step_subset: Option<&[String]>,
  ) -> Result<WorkflowDefinition, ResolveError>;
}

/// Apply an optional step subset to a resolved workflow.
pub(crate) fn apply_subset(
  workflow: WorkflowDefinition,
  step_subset: Option<&[String]>,
) -> Result<WorkflowDefinition, ResolveError> {
  match step_subset {
    Some(keys) => Ok(workflow.subset(keys)?),
    None => Ok(workflow),
  }
}
