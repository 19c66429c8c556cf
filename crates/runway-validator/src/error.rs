use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a config value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorReason {
  RuntimeTypeMismatch,
  MissingRequiredField,
  FieldNotDefined,
  SelectorFieldError,
  EnumValueNotFound,
  /// The schema refers to a type key it does not define.
  UnknownTypeKey,
  /// A type leads back to itself without consuming any of the document.
  RecursiveType,
}

/// A schema snapshot that cannot be used to validate anything.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
  #[error("type '{type_key}' refers to '{reference}' which the schema does not define")]
  UnknownReference { type_key: String, reference: String },

  #[error("noneable type '{0}' never resolves to a concrete type")]
  NoneableCycle(String),
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
  pub reason: ErrorReason,
  pub message: String,
  /// Field names and `[index]` segments from the document root to the value.
  pub path: Vec<String>,
}

impl ValidationError {
  pub fn new(reason: ErrorReason, path: &[String], message: impl Into<String>) -> Self {
    Self {
      reason,
      message: message.into(),
      path: path.to_vec(),
    }
  }

  /// Dotted rendering of the path, `root` for the document itself.
  pub fn path_string(&self) -> String {
    if self.path.is_empty() {
      return "root".to_string();
    }
    let mut rendered = String::from("root");
    for segment in &self.path {
      if segment.starts_with('[') {
        rendered.push_str(segment);
      } else {
        rendered.push(':');
        rendered.push_str(segment);
      }
    }
    rendered
  }

  /// Whether the error points at (or inside) the given top-level key.
  pub fn references(&self, key: &str) -> bool {
    self.path.first().is_some_and(|first| first == key)
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.path_string(), self.message)
  }
}
