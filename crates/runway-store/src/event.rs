use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use runway_validator::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
  Debug,
  Info,
  Warning,
  Error,
}

/// Kind of error carried by a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  /// The run's configuration does not satisfy the workflow schema.
  InvalidConfig,
  Unexpected,
}

/// Serializable description of an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
  pub kind: ErrorKind,
  pub message: String,
  #[serde(default)]
  pub stack: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cause: Option<Box<ErrorInfo>>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub validation_errors: Vec<ValidationError>,
}

/// An immutable record appended to a run's event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEvent {
  pub run_id: String,
  pub timestamp: DateTime<Utc>,
  pub level: EventLevel,
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<ErrorInfo>,
}

impl DiagnosticEvent {
  /// Event recording that a run's stored configuration failed validation.
  pub fn invalid_config(
    run_id: impl Into<String>,
    workflow_name: &str,
    errors: Vec<ValidationError>,
  ) -> Self {
    let message = format!("Error in config for workflow {}", workflow_name);
    Self {
      run_id: run_id.into(),
      timestamp: Utc::now(),
      level: EventLevel::Error,
      message: message.clone(),
      error: Some(ErrorInfo {
        kind: ErrorKind::InvalidConfig,
        message,
        stack: Vec::new(),
        cause: None,
        validation_errors: errors,
      }),
    }
  }

  pub fn error_kind(&self) -> Option<ErrorKind> {
    self.error.as_ref().map(|error| error.kind)
  }
}
