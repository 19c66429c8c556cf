//! Runway Store
//!
//! This crate provides the storage trait and implementations for run records
//! and their event logs. Data is persisted to SQLite, or kept in memory for
//! tests and embedded use.
//!
//! The [`RunStore`] trait defines operations for:
//! - Creating run records (atomic, create-if-absent by run id)
//! - Looking runs up by id
//! - Appending diagnostic events and marking runs failed
//! - Recording per-step outcomes, read back when a run is retried

mod event;
mod memory;
mod sqlite;
mod types;

pub use event::{DiagnosticEvent, ErrorInfo, ErrorKind, EventLevel};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use types::{RunRecord, RunStatus, StepStatus, make_new_run_id};

use std::collections::BTreeMap;

use async_trait::async_trait;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// The requested run was not found.
  #[error("run not found: {0}")]
  NotFound(String),

  /// A run with this id already exists.
  #[error("run already exists: {0}")]
  AlreadyExists(String),

  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  /// Applying migrations failed.
  #[error("migration error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Storage trait for run records and their event logs.
#[async_trait]
pub trait RunStore: Send + Sync {
  /// Insert a new run as a single atomic write.
  ///
  /// Never overwrites: returns `AlreadyExists` if the id is taken.
  async fn create_run(&self, run: &RunRecord) -> Result<RunRecord, StoreError>;

  /// Get a run by id. `Ok(None)` when no such run exists.
  async fn get_run(&self, run_id: &str) -> Result<Option<RunRecord>, StoreError>;

  /// Append an event to a run's log.
  async fn append_event(&self, run_id: &str, event: &DiagnosticEvent) -> Result<(), StoreError>;

  /// Transition a run to `Failure`.
  async fn mark_failed(&self, run_id: &str) -> Result<(), StoreError>;

  /// Append `event` and mark the run failed as one logical unit.
  ///
  /// The default applies the two writes in sequence, event first, so the
  /// status transition is the commit point. Implementations that can do
  /// better (a transaction) override it.
  async fn fail_run_with_event(
    &self,
    run_id: &str,
    event: &DiagnosticEvent,
  ) -> Result<(), StoreError> {
    self.append_event(run_id, event).await?;
    self.mark_failed(run_id).await
  }

  /// All events of a run, oldest first.
  async fn events_for_run(&self, run_id: &str) -> Result<Vec<DiagnosticEvent>, StoreError>;

  /// Record the latest outcome of one step of a run.
  async fn record_step_status(
    &self,
    run_id: &str,
    step_key: &str,
    status: StepStatus,
  ) -> Result<(), StoreError>;

  /// Latest recorded outcome per step of a run.
  async fn step_statuses(&self, run_id: &str) -> Result<BTreeMap<String, StepStatus>, StoreError>;
}
