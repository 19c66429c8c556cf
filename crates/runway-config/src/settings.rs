use serde::{Deserialize, Serialize};

/// How a creation path treats a caller-supplied run id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunIdPolicy {
  /// Use the supplied id when present, generate one otherwise.
  HonorSupplied,
  /// Always generate a fresh id and ignore any supplied one.
  AlwaysGenerate,
}

impl RunIdPolicy {
  /// Returns the supplied id if this policy honors it.
  pub fn accept<'a>(&self, supplied: Option<&'a str>) -> Option<&'a str> {
    match self {
      RunIdPolicy::HonorSupplied => supplied.filter(|id| !id.is_empty()),
      RunIdPolicy::AlwaysGenerate => None,
    }
  }
}

/// Settings for the run lifecycle layer.
///
/// Loaded from `runway.json` in the data directory when present. Every
/// field has a default, so an empty object is a valid settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleSettings {
  /// Run id policy for runs created with configuration validation enforced.
  pub validated_run_ids: RunIdPolicy,
  /// Run id policy for runs that are recorded even when their configuration
  /// is invalid (e.g. runs promised to a scheduler up front).
  pub possibly_invalid_run_ids: RunIdPolicy,
}

impl Default for LifecycleSettings {
  fn default() -> Self {
    Self {
      validated_run_ids: RunIdPolicy::HonorSupplied,
      possibly_invalid_run_ids: RunIdPolicy::AlwaysGenerate,
    }
  }
}
