use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use runway_config::Tags;
use runway_plan::ExecutionPlanSnapshot;
use runway_workflow::WorkflowSnapshot;

use crate::{DiagnosticEvent, RunRecord, RunStatus, RunStore, StepStatus, StoreError};

/// SQLite-based store implementation.
pub struct SqliteStore {
  pool: SqlitePool,
}

/// Row shape of the `runs` table.
#[derive(FromRow)]
struct RunRow {
  run_id: String,
  workflow_name: String,
  step_subset: Option<Json<Vec<String>>>,
  config: Json<serde_json::Value>,
  mode: String,
  step_keys_to_execute: Json<Vec<String>>,
  status: Option<RunStatus>,
  tags: Json<Tags>,
  root_run_id: Option<String>,
  parent_run_id: Option<String>,
  workflow_snapshot: Json<WorkflowSnapshot>,
  execution_plan_snapshot: Option<Json<ExecutionPlanSnapshot>>,
  parent_workflow_snapshot: Option<Json<WorkflowSnapshot>>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<RunRow> for RunRecord {
  fn from(row: RunRow) -> Self {
    RunRecord {
      run_id: row.run_id,
      workflow_name: row.workflow_name,
      step_subset: row.step_subset.map(|subset| subset.0),
      config: row.config.0,
      mode: row.mode,
      step_keys_to_execute: row.step_keys_to_execute.0,
      status: row.status,
      tags: row.tags.0,
      root_run_id: row.root_run_id,
      parent_run_id: row.parent_run_id,
      workflow_snapshot: row.workflow_snapshot.0,
      execution_plan_snapshot: row.execution_plan_snapshot.map(|plan| plan.0),
      parent_workflow_snapshot: row.parent_workflow_snapshot.map(|snapshot| snapshot.0),
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

const SELECT_RUN: &str = r#"
    SELECT run_id, workflow_name, step_subset, config, mode, step_keys_to_execute, status, tags,
           root_run_id, parent_run_id, workflow_snapshot, execution_plan_snapshot,
           parent_workflow_snapshot, created_at, updated_at
    FROM runs
    WHERE run_id = ?
"#;

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Open (creating if missing) the database at `url` and run migrations.
  pub async fn open(url: &str) -> Result<Self, StoreError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    let store = Self::new(pool);
    store.migrate().await?;
    Ok(store)
  }

  /// A migrated, private in-memory database.
  pub async fn in_memory() -> Result<Self, StoreError> {
    // Every connection to `:memory:` is its own database, so keep exactly one.
    let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .connect("sqlite::memory:")
      .await?;
    let store = Self::new(pool);
    store.migrate().await?;
    Ok(store)
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), StoreError> {
    sqlx::migrate!("../../migrations").run(&self.pool).await?;
    Ok(())
  }
}

/// Map constraint violations on run-scoped writes to store errors.
fn write_error(error: sqlx::Error, run_id: &str) -> StoreError {
  if let sqlx::Error::Database(db_error) = &error {
    if db_error.is_unique_violation() {
      return StoreError::AlreadyExists(run_id.to_string());
    }
    if db_error.is_foreign_key_violation() {
      return StoreError::NotFound(run_id.to_string());
    }
  }
  StoreError::Database(error)
}

#[async_trait]
impl RunStore for SqliteStore {
  async fn create_run(&self, run: &RunRecord) -> Result<RunRecord, StoreError> {
    sqlx::query(
      r#"
            INSERT INTO runs (run_id, workflow_name, step_subset, config, mode, step_keys_to_execute,
                              status, tags, root_run_id, parent_run_id, workflow_snapshot,
                              execution_plan_snapshot, parent_workflow_snapshot, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
    )
    .bind(&run.run_id)
    .bind(&run.workflow_name)
    .bind(run.step_subset.as_ref().map(Json))
    .bind(Json(&run.config))
    .bind(&run.mode)
    .bind(Json(&run.step_keys_to_execute))
    .bind(run.status)
    .bind(Json(&run.tags))
    .bind(&run.root_run_id)
    .bind(&run.parent_run_id)
    .bind(Json(&run.workflow_snapshot))
    .bind(run.execution_plan_snapshot.as_ref().map(Json))
    .bind(run.parent_workflow_snapshot.as_ref().map(Json))
    .bind(run.created_at)
    .bind(run.updated_at)
    .execute(&self.pool)
    .await
    .map_err(|e| write_error(e, &run.run_id))?;

    debug!(run_id = %run.run_id, "inserted run");
    Ok(run.clone())
  }

  async fn get_run(&self, run_id: &str) -> Result<Option<RunRecord>, StoreError> {
    let row: Option<RunRow> = sqlx::query_as(SELECT_RUN)
      .bind(run_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(RunRecord::from))
  }

  async fn append_event(&self, run_id: &str, event: &DiagnosticEvent) -> Result<(), StoreError> {
    sqlx::query(
      r#"
            INSERT INTO run_events (run_id, timestamp, payload)
            VALUES (?, ?, ?)
            "#,
    )
    .bind(run_id)
    .bind(event.timestamp)
    .bind(Json(event))
    .execute(&self.pool)
    .await
    .map_err(|e| write_error(e, run_id))?;

    Ok(())
  }

  async fn mark_failed(&self, run_id: &str) -> Result<(), StoreError> {
    let result = sqlx::query(
      r#"
            UPDATE runs
            SET status = ?, updated_at = ?
            WHERE run_id = ?
            "#,
    )
    .bind(RunStatus::Failure)
    .bind(Utc::now())
    .bind(run_id)
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      return Err(StoreError::NotFound(run_id.to_string()));
    }
    Ok(())
  }

  async fn fail_run_with_event(
    &self,
    run_id: &str,
    event: &DiagnosticEvent,
  ) -> Result<(), StoreError> {
    let mut tx = self.pool.begin().await?;

    sqlx::query(
      r#"
            INSERT INTO run_events (run_id, timestamp, payload)
            VALUES (?, ?, ?)
            "#,
    )
    .bind(run_id)
    .bind(event.timestamp)
    .bind(Json(event))
    .execute(&mut *tx)
    .await
    .map_err(|e| write_error(e, run_id))?;

    let result = sqlx::query(
      r#"
            UPDATE runs
            SET status = ?, updated_at = ?
            WHERE run_id = ?
            "#,
    )
    .bind(RunStatus::Failure)
    .bind(Utc::now())
    .bind(run_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
      // Dropping the transaction rolls back the event insert
      return Err(StoreError::NotFound(run_id.to_string()));
    }

    tx.commit().await?;
    debug!(run_id, "marked run failed with diagnostic event");
    Ok(())
  }

  async fn events_for_run(&self, run_id: &str) -> Result<Vec<DiagnosticEvent>, StoreError> {
    let rows: Vec<(Json<DiagnosticEvent>,)> = sqlx::query_as(
      r#"
            SELECT payload
            FROM run_events
            WHERE run_id = ?
            ORDER BY id ASC
            "#,
    )
    .bind(run_id)
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().map(|(payload,)| payload.0).collect())
  }

  async fn record_step_status(
    &self,
    run_id: &str,
    step_key: &str,
    status: StepStatus,
  ) -> Result<(), StoreError> {
    sqlx::query(
      r#"
            INSERT INTO run_steps (run_id, step_key, status, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (run_id, step_key) DO UPDATE
            SET status = excluded.status, updated_at = excluded.updated_at
            "#,
    )
    .bind(run_id)
    .bind(step_key)
    .bind(status)
    .bind(Utc::now())
    .execute(&self.pool)
    .await
    .map_err(|e| write_error(e, run_id))?;

    Ok(())
  }

  async fn step_statuses(&self, run_id: &str) -> Result<BTreeMap<String, StepStatus>, StoreError> {
    let rows: Vec<(String, StepStatus)> = sqlx::query_as(
      r#"
            SELECT step_key, status
            FROM run_steps
            WHERE run_id = ?
            "#,
    )
    .bind(run_id)
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().collect())
  }
}
