use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use runway_workflow::WorkflowDefinition;

use crate::error::ResolveError;
use crate::resolver::{WorkflowResolver, apply_subset};

/// Resolver over definitions registered in memory.
///
/// Registering a definition under an existing name replaces it, which is how
/// a new schema version is published.
#[derive(Default)]
pub struct InMemoryResolver {
  workflows: RwLock<HashMap<String, WorkflowDefinition>>,
}

impl InMemoryResolver {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register (or replace) a workflow under its own name.
  pub async fn register(&self, workflow: WorkflowDefinition) {
    self
      .workflows
      .write()
      .await
      .insert(workflow.name().to_string(), workflow);
  }
}

#[async_trait]
impl WorkflowResolver for InMemoryResolver {
  async fn resolve(
    &self,
    name: &str,
    step_subset: Option<&[String]>,
  ) -> Result<WorkflowDefinition, ResolveError> {
    let workflow = self
      .workflows
      .read()
      .await
      .get(name)
      .cloned()
      .ok_or_else(|| ResolveError::WorkflowNotFound {
        name: name.to_string(),
      })?;
    apply_subset(workflow, step_subset)
  }
}
