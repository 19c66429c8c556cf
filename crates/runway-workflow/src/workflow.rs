use std::collections::HashSet;

use serde::Serialize;

use runway_config::Tags;
use runway_validator::ConfigSchemaSnapshot;

use crate::error::WorkflowError;
use crate::graph::Graph;
use crate::snapshot::{Edge, WorkflowSnapshot};

/// A resolved workflow: structural snapshot, config schema, and lineage.
///
/// Owned by whoever resolved it. The lifecycle layer only reads it.
/// Only [`WorkflowDefinition::new`] builds one, so it is serialized for
/// inspection but never deserialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowDefinition {
  snapshot: WorkflowSnapshot,
  #[serde(skip_serializing_if = "Option::is_none")]
  parent_snapshot: Option<WorkflowSnapshot>,
  config_schema: ConfigSchemaSnapshot,
  #[serde(skip_serializing_if = "Option::is_none")]
  step_subset: Option<Vec<String>>,
}

impl WorkflowDefinition {
  /// Build a definition, validating the graph, the config schema and the
  /// mode root types.
  pub fn new(
    snapshot: WorkflowSnapshot,
    config_schema: ConfigSchemaSnapshot,
  ) -> Result<Self, WorkflowError> {
    if snapshot.steps.is_empty() {
      return Err(WorkflowError::NoSteps(snapshot.name));
    }
    // Graph::new checks duplicate keys and dangling edges
    Graph::new(&snapshot.steps, &snapshot.edges)?.topological_order()?;
    config_schema.check()?;

    let mut modes = HashSet::new();
    for mode in &snapshot.modes {
      if !modes.insert(mode.name.as_str()) {
        return Err(WorkflowError::DuplicateMode(mode.name.clone()));
      }
      if !config_schema.contains(&mode.root_config_key) {
        return Err(WorkflowError::UnknownRootType {
          mode: mode.name.clone(),
          type_key: mode.root_config_key.clone(),
        });
      }
    }

    Ok(Self {
      snapshot,
      parent_snapshot: None,
      config_schema,
      step_subset: None,
    })
  }

  pub fn name(&self) -> &str {
    &self.snapshot.name
  }

  pub fn snapshot(&self) -> &WorkflowSnapshot {
    &self.snapshot
  }

  /// The full workflow this one was derived from, for subset workflows.
  pub fn parent_snapshot(&self) -> Option<&WorkflowSnapshot> {
    self.parent_snapshot.as_ref()
  }

  pub fn config_schema(&self) -> &ConfigSchemaSnapshot {
    &self.config_schema
  }

  pub fn step_subset(&self) -> Option<&[String]> {
    self.step_subset.as_deref()
  }

  pub fn tags(&self) -> &Tags {
    &self.snapshot.tags
  }

  pub fn has_step(&self, step_key: &str) -> bool {
    self.snapshot.step(step_key).is_some()
  }

  /// Root config type key for a mode.
  pub fn root_config_key_for_mode(&self, mode: &str) -> Result<&str, WorkflowError> {
    self
      .snapshot
      .mode(mode)
      .map(|m| m.root_config_key.as_str())
      .ok_or_else(|| WorkflowError::ModeNotFound {
        workflow: self.snapshot.name.clone(),
        mode: mode.to_string(),
      })
  }

  /// Build the graph structure for traversal.
  pub fn graph(&self) -> Result<Graph, WorkflowError> {
    Graph::new(&self.snapshot.steps, &self.snapshot.edges)
  }

  /// Every step key in execution order.
  pub fn step_keys_in_order(&self) -> Result<Vec<String>, WorkflowError> {
    self.graph()?.topological_order()
  }

  /// Derive a workflow containing only `step_keys` and the edges among them.
  ///
  /// The derived definition records the full snapshot as its parent.
  pub fn subset(&self, step_keys: &[String]) -> Result<Self, WorkflowError> {
    if step_keys.is_empty() {
      return Err(WorkflowError::EmptySubset);
    }
    for key in step_keys {
      if !self.has_step(key) {
        return Err(WorkflowError::StepNotFound(key.clone()));
      }
    }

    let selected: HashSet<&str> = step_keys.iter().map(String::as_str).collect();
    let steps: Vec<_> = self
      .snapshot
      .steps
      .iter()
      .filter(|step| selected.contains(step.key.as_str()))
      .cloned()
      .collect();
    let edges: Vec<Edge> = self
      .snapshot
      .edges
      .iter()
      .filter(|edge| selected.contains(edge.from.as_str()) && selected.contains(edge.to.as_str()))
      .cloned()
      .collect();
    let subset_keys: Vec<String> = steps.iter().map(|step| step.key.clone()).collect();

    let snapshot = WorkflowSnapshot {
      steps,
      edges,
      ..self.snapshot.clone()
    };

    Ok(Self {
      snapshot,
      parent_snapshot: Some(
        self
          .parent_snapshot
          .clone()
          .unwrap_or_else(|| self.snapshot.clone()),
      ),
      config_schema: self.config_schema.clone(),
      step_subset: Some(subset_keys),
    })
  }
}
