use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::WorkflowError;
use crate::snapshot::{Edge, StepSnapshot};

/// Graph structure for traversal and ordering.
#[derive(Debug, Clone)]
pub struct Graph {
  /// Step keys in declaration order.
  order: Vec<String>,
  /// Adjacency list: step_key -> list of downstream step_keys.
  adjacency: HashMap<String, Vec<String>>,
  /// Reverse adjacency: step_key -> list of upstream step_keys.
  reverse_adjacency: HashMap<String, Vec<String>>,
}

impl Graph {
  /// Build a graph from steps and edges.
  ///
  /// Fails on duplicate step keys or edges that reference unknown steps.
  pub fn new(steps: &[StepSnapshot], edges: &[Edge]) -> Result<Self, WorkflowError> {
    let mut order = Vec::with_capacity(steps.len());
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    let mut reverse_adjacency: HashMap<String, Vec<String>> = HashMap::new();

    // Initialize all steps
    for step in steps {
      if adjacency.insert(step.key.clone(), Vec::new()).is_some() {
        return Err(WorkflowError::DuplicateStepKey(step.key.clone()));
      }
      reverse_adjacency.insert(step.key.clone(), Vec::new());
      order.push(step.key.clone());
    }

    // Build adjacency lists
    for edge in edges {
      if !adjacency.contains_key(&edge.from) || !adjacency.contains_key(&edge.to) {
        return Err(WorkflowError::InvalidEdge {
          from: edge.from.clone(),
          to: edge.to.clone(),
        });
      }
      adjacency
        .entry(edge.from.clone())
        .or_default()
        .push(edge.to.clone());
      reverse_adjacency
        .entry(edge.to.clone())
        .or_default()
        .push(edge.from.clone());
    }

    Ok(Self {
      order,
      adjacency,
      reverse_adjacency,
    })
  }

  /// Whether the graph contains the step.
  pub fn contains(&self, step_key: &str) -> bool {
    self.adjacency.contains_key(step_key)
  }

  /// Get entry points (steps with no incoming edges), in declaration order.
  pub fn entry_points(&self) -> Vec<&str> {
    self
      .order
      .iter()
      .filter(|key| self.upstream(key).is_empty())
      .map(String::as_str)
      .collect()
  }

  /// Get downstream steps for a given step.
  pub fn downstream(&self, step_key: &str) -> &[String] {
    self
      .adjacency
      .get(step_key)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get upstream steps for a given step.
  pub fn upstream(&self, step_key: &str) -> &[String] {
    self
      .reverse_adjacency
      .get(step_key)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Topological order, ties broken by declaration order.
  ///
  /// Returns `CycleDetected` if not every step can be ordered.
  pub fn topological_order(&self) -> Result<Vec<String>, WorkflowError> {
    let position: HashMap<&str, usize> = self
      .order
      .iter()
      .enumerate()
      .map(|(i, key)| (key.as_str(), i))
      .collect();

    let mut in_degree: HashMap<&str, usize> = self
      .order
      .iter()
      .map(|key| (key.as_str(), self.upstream(key).len()))
      .collect();

    // Ready steps keyed by declaration position so the smallest is taken first
    let mut ready: BTreeSet<usize> = in_degree
      .iter()
      .filter(|(_, degree)| **degree == 0)
      .map(|(key, _)| position[key])
      .collect();

    let mut sorted = Vec::with_capacity(self.order.len());
    while let Some(index) = ready.pop_first() {
      let key = &self.order[index];
      for next in self.downstream(key) {
        if let Some(degree) = in_degree.get_mut(next.as_str()) {
          *degree -= 1;
          if *degree == 0 {
            ready.insert(position[next.as_str()]);
          }
        }
      }
      sorted.push(key.clone());
    }

    if sorted.len() != self.order.len() {
      return Err(WorkflowError::CycleDetected);
    }
    Ok(sorted)
  }

  /// All steps reachable downstream from any of `roots`, roots included.
  pub fn downstream_closure<'a, I>(&self, roots: I) -> HashSet<String>
  where
    I: IntoIterator<Item = &'a str>,
  {
    let mut seen = HashSet::new();
    let mut stack: Vec<String> = roots.into_iter().map(str::to_string).collect();
    while let Some(key) = stack.pop() {
      if !seen.insert(key.clone()) {
        continue;
      }
      for next in self.downstream(&key) {
        if !seen.contains(next) {
          stack.push(next.clone());
        }
      }
    }
    seen
  }
}
