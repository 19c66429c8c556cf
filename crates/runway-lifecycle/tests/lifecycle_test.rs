use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use runway_config::{ExecutionRequest, RESUME_RETRY_TAG, Tags, WorkflowSelector};
use runway_lifecycle::{
  ExecutionInfoOutcome, LifecycleError, RunLifecycle, SelectionError, Strictness,
};
use runway_resolver::{InMemoryResolver, ResolveError};
use runway_store::{
  DiagnosticEvent, ErrorKind, MemoryStore, RunRecord, RunStatus, RunStore, SqliteStore, StepStatus,
  StoreError,
};
use runway_validator::{
  ConfigField, ConfigSchemaSnapshot, ConfigType, ConfigValidator, SchemaValidator,
};
use runway_workflow::{Edge, ModeSnapshot, StepSnapshot, WorkflowDefinition, WorkflowSnapshot};

/// Store wrapper that counts every write.
#[derive(Default)]
struct CountingStore {
  inner: MemoryStore,
  creates: AtomicUsize,
  events: AtomicUsize,
  failures: AtomicUsize,
  step_writes: AtomicUsize,
}

impl CountingStore {
  fn creates(&self) -> usize {
    self.creates.load(Ordering::SeqCst)
  }

  fn events(&self) -> usize {
    self.events.load(Ordering::SeqCst)
  }

  fn failures(&self) -> usize {
    self.failures.load(Ordering::SeqCst)
  }

  fn writes(&self) -> usize {
    self.creates() + self.events() + self.failures() + self.step_writes.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl RunStore for CountingStore {
  async fn create_run(&self, run: &RunRecord) -> Result<RunRecord, StoreError> {
    self.creates.fetch_add(1, Ordering::SeqCst);
    self.inner.create_run(run).await
  }

  async fn get_run(&self, run_id: &str) -> Result<Option<RunRecord>, StoreError> {
    self.inner.get_run(run_id).await
  }

  async fn append_event(&self, run_id: &str, event: &DiagnosticEvent) -> Result<(), StoreError> {
    self.events.fetch_add(1, Ordering::SeqCst);
    self.inner.append_event(run_id, event).await
  }

  async fn mark_failed(&self, run_id: &str) -> Result<(), StoreError> {
    self.failures.fetch_add(1, Ordering::SeqCst);
    self.inner.mark_failed(run_id).await
  }

  async fn fail_run_with_event(
    &self,
    run_id: &str,
    event: &DiagnosticEvent,
  ) -> Result<(), StoreError> {
    self.events.fetch_add(1, Ordering::SeqCst);
    self.failures.fetch_add(1, Ordering::SeqCst);
    self.inner.fail_run_with_event(run_id, event).await
  }

  async fn events_for_run(&self, run_id: &str) -> Result<Vec<DiagnosticEvent>, StoreError> {
    self.inner.events_for_run(run_id).await
  }

  async fn record_step_status(
    &self,
    run_id: &str,
    step_key: &str,
    status: StepStatus,
  ) -> Result<(), StoreError> {
    self.step_writes.fetch_add(1, Ordering::SeqCst);
    self.inner.record_step_status(run_id, step_key, status).await
  }

  async fn step_statuses(&self, run_id: &str) -> Result<BTreeMap<String, StepStatus>, StoreError> {
    self.inner.step_statuses(run_id).await
  }
}

fn tags(pairs: &[(&str, &str)]) -> Tags {
  pairs
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// `W`: ingest -> validate -> publish, plus an independent `audit`.
/// Mode `default` requires `x: Int`.
fn workflow_w(schema: ConfigSchemaSnapshot) -> WorkflowDefinition {
  let snapshot = WorkflowSnapshot {
    name: "W".to_string(),
    description: Some("scenario workflow".to_string()),
    steps: vec![
      StepSnapshot::new("ingest"),
      StepSnapshot::new("validate"),
      StepSnapshot::new("publish"),
      StepSnapshot::new("audit"),
    ],
    edges: vec![
      Edge::new("ingest", "validate"),
      Edge::new("validate", "publish"),
    ],
    modes: vec![ModeSnapshot::new("default", "W.Default")],
    tags: tags(&[("team", "data"), ("tier", "gold")]),
  };
  WorkflowDefinition::new(snapshot, schema).unwrap()
}

fn schema_v1() -> ConfigSchemaSnapshot {
  ConfigSchemaSnapshot::new(1).with_type(
    "W.Default",
    ConfigType::Shape {
      fields: [("x".to_string(), ConfigField::required("Int"))].into(),
    },
  )
}

/// Version 2 also requires `y`.
fn schema_v2() -> ConfigSchemaSnapshot {
  ConfigSchemaSnapshot::new(2).with_type(
    "W.Default",
    ConfigType::Shape {
      fields: [
        ("x".to_string(), ConfigField::required("Int")),
        ("y".to_string(), ConfigField::required("String")),
      ]
      .into(),
    },
  )
}

fn request(config: serde_json::Value) -> ExecutionRequest {
  ExecutionRequest::new(WorkflowSelector::new("W"), "default", config)
}

async fn counting_lifecycle() -> RunLifecycle<CountingStore, InMemoryResolver> {
  let resolver = InMemoryResolver::new();
  resolver.register(workflow_w(schema_v1())).await;
  RunLifecycle::new(CountingStore::default(), resolver)
}

#[tokio::test]
async fn test_valid_config_creates_planned_run() {
  let lifecycle = counting_lifecycle().await;
  let workflow = workflow_w(schema_v1());

  let run = lifecycle
    .create_validated_run(&request(json!({ "x": 5 })), &workflow)
    .await
    .unwrap();

  assert_eq!(run.status, Some(RunStatus::NotStarted));
  assert_eq!(
    run.step_keys_to_execute,
    vec!["ingest", "validate", "publish", "audit"]
  );
  let plan = run.execution_plan_snapshot.as_ref().unwrap();
  assert_eq!(plan.step_keys(), vec!["ingest", "validate", "publish", "audit"]);
  assert_eq!(plan.workflow_snapshot_id, workflow.snapshot().snapshot_id());
  assert_eq!(run.workflow_snapshot, *workflow.snapshot());
  assert!(run.parent_workflow_snapshot.is_none());
  assert_eq!(run.config, json!({ "x": 5 }));
  assert!(run.is_executable());
  assert_eq!(lifecycle.store().creates(), 1);

  let stored = lifecycle.store().get_run(&run.run_id).await.unwrap();
  assert_eq!(stored, Some(run));
}

#[tokio::test]
async fn test_invalid_config_creates_nothing() {
  let lifecycle = counting_lifecycle().await;
  let workflow = workflow_w(schema_v1());

  let result = lifecycle
    .create_validated_run(&request(json!({ "x": "oops" })), &workflow)
    .await;

  match result {
    Err(LifecycleError::InvalidConfig {
      workflow: name,
      mode,
      errors,
    }) => {
      assert_eq!(name, "W");
      assert_eq!(mode, "default");
      assert!(!errors.is_empty());
      assert!(errors.iter().any(|e| e.references("x")));
    }
    other => panic!("expected InvalidConfig, got {:?}", other),
  }
  assert_eq!(lifecycle.store().creates(), 0);
  assert_eq!(lifecycle.store().writes(), 0);
  assert_eq!(lifecycle.store().inner.run_count().await, 0);
}

#[tokio::test]
async fn test_possibly_invalid_always_creates_one_run() {
  let lifecycle = counting_lifecycle().await;
  let workflow = workflow_w(schema_v1());

  let invalid = lifecycle
    .create_possibly_invalid_run(&request(json!({ "x": "oops" })), &workflow)
    .await
    .unwrap();
  assert!(invalid.execution_plan_snapshot.is_none());
  assert_eq!(invalid.status, None);
  assert!(!invalid.is_executable());
  assert_eq!(lifecycle.store().creates(), 1);

  let valid = lifecycle
    .create_possibly_invalid_run(&request(json!({ "x": 5 })), &workflow)
    .await
    .unwrap();
  assert!(valid.execution_plan_snapshot.is_some());
  assert_eq!(valid.status, None);
  assert_eq!(lifecycle.store().creates(), 2);
  assert_ne!(invalid.run_id, valid.run_id);
}

#[tokio::test]
async fn test_tags_merge_with_request_winning() {
  let lifecycle = counting_lifecycle().await;
  let workflow = workflow_w(schema_v1());

  let mut req = request(json!({ "x": 5 }));
  req.metadata.tags = tags(&[("tier", "silver"), ("owner", "ops")]);

  for strictness in [Strictness::Validated, Strictness::PossiblyInvalid] {
    let run = lifecycle.create_run(&req, &workflow, strictness).await.unwrap();
    assert_eq!(
      run.tags,
      tags(&[("team", "data"), ("tier", "silver"), ("owner", "ops")])
    );
  }
}

#[tokio::test]
async fn test_lineage_is_recorded() {
  let lifecycle = counting_lifecycle().await;
  let workflow = workflow_w(schema_v1());

  let mut req = request(json!({ "x": 5 }));
  req.metadata.root_run_id = Some("root".to_string());
  req.metadata.parent_run_id = Some("parent".to_string());

  let run = lifecycle.create_validated_run(&req, &workflow).await.unwrap();
  assert_eq!(run.root_run_id.as_deref(), Some("root"));
  assert_eq!(run.parent_run_id.as_deref(), Some("parent"));
}

#[tokio::test]
async fn test_explicit_step_keys() {
  let lifecycle = counting_lifecycle().await;
  let workflow = workflow_w(schema_v1());

  let mut req = request(json!({ "x": 5 }));
  req.step_keys = Some(vec!["publish".to_string(), "validate".to_string()]);
  let run = lifecycle.create_validated_run(&req, &workflow).await.unwrap();

  assert_eq!(run.step_keys_to_execute, vec!["validate", "publish"]);
  let plan = run.execution_plan_snapshot.unwrap();
  assert_eq!(plan.step("validate").unwrap().external_upstream, vec!["ingest"]);

  req.step_keys = Some(vec!["missing".to_string()]);
  assert!(matches!(
    lifecycle.create_validated_run(&req, &workflow).await,
    Err(LifecycleError::Selection(SelectionError::UnknownStep { .. }))
  ));
  assert_eq!(lifecycle.store().creates(), 1);
}

#[tokio::test]
async fn test_subset_workflow_records_parent_snapshot() {
  let lifecycle = counting_lifecycle().await;

  let mut req = request(json!({ "x": 5 }));
  req.selector.step_subset = Some(vec!["validate".to_string(), "publish".to_string()]);
  let run = lifecycle.submit(&req, Strictness::Validated).await.unwrap();

  assert_eq!(
    run.step_subset,
    Some(vec!["validate".to_string(), "publish".to_string()])
  );
  assert_eq!(run.step_keys_to_execute, vec!["validate", "publish"]);
  assert_eq!(run.workflow_snapshot.steps.len(), 2);
  assert_eq!(
    run.parent_workflow_snapshot.as_ref().map(|s| s.steps.len()),
    Some(4)
  );

  // Lookup resolves the same subset again
  let info = lifecycle
    .get_execution_info_or_error(&run.run_id)
    .await
    .unwrap()
    .into_ready()
    .unwrap();
  assert_eq!(info.workflow.step_subset(), run.step_subset.as_deref());
}

#[tokio::test]
async fn test_lookup_is_idempotent_and_read_only() {
  let lifecycle = counting_lifecycle().await;
  let workflow = workflow_w(schema_v1());
  let run = lifecycle
    .create_validated_run(&request(json!({ "x": 5 })), &workflow)
    .await
    .unwrap();
  let writes = lifecycle.store().writes();

  let first = lifecycle.get_execution_info_or_error(&run.run_id).await.unwrap();
  let second = lifecycle.get_execution_info_or_error(&run.run_id).await.unwrap();

  assert!(first.is_ready());
  assert_eq!(first, second);
  let info = first.into_ready().unwrap();
  assert_eq!(info.run, run);
  assert_eq!(info.workflow, workflow);
  assert_eq!(lifecycle.store().writes(), writes);
}

#[tokio::test]
async fn test_lookup_missing_run() {
  let lifecycle = counting_lifecycle().await;

  let outcome = lifecycle.get_execution_info_or_error("nope").await.unwrap();
  assert_eq!(
    outcome,
    ExecutionInfoOutcome::RunNotFound {
      run_id: "nope".to_string()
    }
  );
  assert_eq!(lifecycle.store().writes(), 0);
}

#[tokio::test]
async fn test_lookup_invalid_config_fails_run_once() {
  let lifecycle = counting_lifecycle().await;
  let workflow = workflow_w(schema_v1());
  let config = json!({ "x": "oops" });
  let run = lifecycle
    .create_possibly_invalid_run(&request(config.clone()), &workflow)
    .await
    .unwrap();

  let outcome = lifecycle.get_execution_info_or_error(&run.run_id).await.unwrap();

  let expected = SchemaValidator::new().validate(workflow.config_schema(), "W.Default", &config);
  let invalid = match outcome {
    ExecutionInfoOutcome::InvalidConfig(invalid) => invalid,
    other => panic!("expected InvalidConfig, got {:?}", other),
  };
  assert_eq!(invalid.errors, expected.errors());
  assert_eq!(invalid.workflow, workflow);
  assert_eq!(lifecycle.store().events(), 1);
  assert_eq!(lifecycle.store().failures(), 1);

  let stored = lifecycle.store().get_run(&run.run_id).await.unwrap().unwrap();
  assert_eq!(stored.status, Some(RunStatus::Failure));

  let events = lifecycle.store().events_for_run(&run.run_id).await.unwrap();
  assert_eq!(events.len(), 1);
  let error = events[0].error.as_ref().unwrap();
  assert_eq!(error.kind, ErrorKind::InvalidConfig);
  assert_eq!(error.message, "Error in config for workflow W");
  assert!(error.stack.is_empty());
  assert!(error.cause.is_none());
  assert_eq!(error.validation_errors, invalid.errors);
}

#[tokio::test]
async fn test_schema_change_invalidates_stored_run() {
  let lifecycle = counting_lifecycle().await;
  let run = lifecycle
    .submit(&request(json!({ "x": 5 })), Strictness::Validated)
    .await
    .unwrap();

  lifecycle.resolver().register(workflow_w(schema_v2())).await;

  let outcome = lifecycle.get_execution_info_or_error(&run.run_id).await.unwrap();
  let invalid = match outcome {
    ExecutionInfoOutcome::InvalidConfig(invalid) => invalid,
    other => panic!("expected InvalidConfig, got {:?}", other),
  };
  assert!(invalid.errors.iter().any(|e| e.references("y")));
  assert_eq!(invalid.workflow.config_schema().version, 2);
  assert_eq!(lifecycle.store().failures(), 1);
}

#[tokio::test]
async fn test_lookup_with_vanished_workflow_is_fatal() {
  let store = MemoryStore::new();
  let lifecycle = RunLifecycle::new(store, InMemoryResolver::new());
  let run = lifecycle
    .create_validated_run(&request(json!({ "x": 5 })), &workflow_w(schema_v1()))
    .await
    .unwrap();

  assert!(matches!(
    lifecycle.get_execution_info_or_error(&run.run_id).await,
    Err(LifecycleError::Resolve(ResolveError::WorkflowNotFound { .. }))
  ));
}

#[tokio::test]
async fn test_resume_retry_selects_unfinished_steps() {
  let lifecycle = counting_lifecycle().await;
  let workflow = workflow_w(schema_v1());
  let parent = lifecycle
    .create_validated_run(&request(json!({ "x": 5 })), &workflow)
    .await
    .unwrap();

  let store = lifecycle.store();
  store
    .record_step_status(&parent.run_id, "ingest", StepStatus::Success)
    .await
    .unwrap();
  store
    .record_step_status(&parent.run_id, "validate", StepStatus::Failure)
    .await
    .unwrap();
  store
    .record_step_status(&parent.run_id, "audit", StepStatus::Success)
    .await
    .unwrap();

  let mut retry = request(json!({ "x": 5 }));
  retry.metadata.parent_run_id = Some(parent.run_id.clone());
  retry.metadata.root_run_id = Some(parent.run_id.clone());
  retry.metadata.tags = tags(&[(RESUME_RETRY_TAG, "true")]);

  let run = lifecycle.create_validated_run(&retry, &workflow).await.unwrap();
  assert_eq!(run.step_keys_to_execute, vec!["validate", "publish"]);
  assert_eq!(run.tags.get(RESUME_RETRY_TAG).map(String::as_str), Some("true"));
  let plan = run.execution_plan_snapshot.unwrap();
  assert_eq!(plan.step("validate").unwrap().external_upstream, vec!["ingest"]);
  assert_eq!(plan.step("publish").unwrap().upstream, vec!["validate"]);
}

#[tokio::test]
async fn test_resume_retry_errors() {
  let lifecycle = counting_lifecycle().await;
  let workflow = workflow_w(schema_v1());

  let mut retry = request(json!({ "x": 5 }));
  retry.metadata.tags = tags(&[(RESUME_RETRY_TAG, "true")]);
  assert!(matches!(
    lifecycle.create_validated_run(&retry, &workflow).await,
    Err(LifecycleError::Selection(SelectionError::MissingParentRun))
  ));

  retry.metadata.parent_run_id = Some("ghost".to_string());
  assert!(matches!(
    lifecycle.create_validated_run(&retry, &workflow).await,
    Err(LifecycleError::Selection(SelectionError::ParentRunNotFound(_)))
  ));

  let parent = lifecycle
    .create_validated_run(&request(json!({ "x": 5 })), &workflow)
    .await
    .unwrap();
  for step in &parent.step_keys_to_execute {
    lifecycle
      .store()
      .record_step_status(&parent.run_id, step, StepStatus::Success)
      .await
      .unwrap();
  }
  retry.metadata.parent_run_id = Some(parent.run_id.clone());
  assert!(matches!(
    lifecycle.create_validated_run(&retry, &workflow).await,
    Err(LifecycleError::Selection(SelectionError::NothingToRetry(_)))
  ));
  assert_eq!(lifecycle.store().creates(), 1);
}

#[tokio::test]
async fn test_possibly_invalid_records_unresolvable_selection() {
  let lifecycle = counting_lifecycle().await;
  let workflow = workflow_w(schema_v1());

  let mut retry = request(json!({ "x": 5 }));
  retry.metadata.tags = tags(&[(RESUME_RETRY_TAG, "true")]);
  let orphan = lifecycle
    .create_possibly_invalid_run(&retry, &workflow)
    .await
    .unwrap();
  assert!(orphan.step_keys_to_execute.is_empty());
  assert!(orphan.execution_plan_snapshot.is_none());

  retry.metadata.parent_run_id = Some("ghost".to_string());
  let ghost = lifecycle
    .create_possibly_invalid_run(&retry, &workflow)
    .await
    .unwrap();
  assert_eq!(ghost.parent_run_id.as_deref(), Some("ghost"));
  assert!(ghost.step_keys_to_execute.is_empty());
  assert!(ghost.execution_plan_snapshot.is_none());
  assert_eq!(ghost.status, None);

  let mut unknown = request(json!({ "x": 5 }));
  unknown.step_keys = Some(vec!["zzz".to_string(), "ingest".to_string()]);
  let run = lifecycle
    .create_possibly_invalid_run(&unknown, &workflow)
    .await
    .unwrap();
  assert_eq!(run.step_keys_to_execute, vec!["zzz", "ingest"]);
  assert!(run.execution_plan_snapshot.is_none());
  assert!(!run.is_executable());

  assert_eq!(lifecycle.store().creates(), 3);
  assert_eq!(lifecycle.store().inner.run_count().await, 3);
  let stored = lifecycle.store().get_run(&run.run_id).await.unwrap();
  assert_eq!(stored, Some(run));

  // The validated path still refuses the same request
  assert!(matches!(
    lifecycle.create_validated_run(&unknown, &workflow).await,
    Err(LifecycleError::Selection(SelectionError::UnknownStep { .. }))
  ));
  assert_eq!(lifecycle.store().creates(), 3);
}

#[tokio::test]
async fn test_possibly_invalid_records_exhausted_retry() {
  let lifecycle = counting_lifecycle().await;
  let workflow = workflow_w(schema_v1());

  let parent = lifecycle
    .create_validated_run(&request(json!({ "x": 5 })), &workflow)
    .await
    .unwrap();
  for step in &parent.step_keys_to_execute {
    lifecycle
      .store()
      .record_step_status(&parent.run_id, step, StepStatus::Success)
      .await
      .unwrap();
  }

  let mut retry = request(json!({ "x": "oops" }));
  retry.metadata.tags = tags(&[(RESUME_RETRY_TAG, "true")]);
  retry.metadata.parent_run_id = Some(parent.run_id.clone());
  let run = lifecycle
    .create_possibly_invalid_run(&retry, &workflow)
    .await
    .unwrap();
  assert!(run.step_keys_to_execute.is_empty());
  assert!(run.execution_plan_snapshot.is_none());
  assert_eq!(lifecycle.store().creates(), 2);
}

/// Store that keeps the default `fail_run_with_event` and whose failure
/// transition can be made to fail.
#[derive(Default)]
struct BrittleStore {
  inner: MemoryStore,
  reject_failures: bool,
}

#[async_trait]
impl RunStore for BrittleStore {
  async fn create_run(&self, run: &RunRecord) -> Result<RunRecord, StoreError> {
    self.inner.create_run(run).await
  }

  async fn get_run(&self, run_id: &str) -> Result<Option<RunRecord>, StoreError> {
    self.inner.get_run(run_id).await
  }

  async fn append_event(&self, run_id: &str, event: &DiagnosticEvent) -> Result<(), StoreError> {
    self.inner.append_event(run_id, event).await
  }

  async fn mark_failed(&self, run_id: &str) -> Result<(), StoreError> {
    if self.reject_failures {
      return Err(StoreError::NotFound(run_id.to_string()));
    }
    self.inner.mark_failed(run_id).await
  }

  async fn events_for_run(&self, run_id: &str) -> Result<Vec<DiagnosticEvent>, StoreError> {
    self.inner.events_for_run(run_id).await
  }

  async fn record_step_status(
    &self,
    run_id: &str,
    step_key: &str,
    status: StepStatus,
  ) -> Result<(), StoreError> {
    self.inner.record_step_status(run_id, step_key, status).await
  }

  async fn step_statuses(&self, run_id: &str) -> Result<BTreeMap<String, StepStatus>, StoreError> {
    self.inner.step_statuses(run_id).await
  }
}

#[tokio::test]
async fn test_lookup_surfaces_failed_failure_transition() {
  let resolver = InMemoryResolver::new();
  resolver.register(workflow_w(schema_v2())).await;
  let store = BrittleStore {
    reject_failures: true,
    ..Default::default()
  };
  let lifecycle = RunLifecycle::new(store, resolver);

  let run = lifecycle
    .create_validated_run(&request(json!({ "x": 5 })), &workflow_w(schema_v1()))
    .await
    .unwrap();

  let result = lifecycle.get_execution_info_or_error(&run.run_id).await;
  assert!(matches!(result, Err(LifecycleError::Store(StoreError::NotFound(_)))));

  // The diagnostic is written before the failure transition, which did not happen
  let events = lifecycle.store().events_for_run(&run.run_id).await.unwrap();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].error_kind(), Some(ErrorKind::InvalidConfig));
  let stored = lifecycle.store().get_run(&run.run_id).await.unwrap().unwrap();
  assert_eq!(stored.status, Some(RunStatus::NotStarted));
}

#[tokio::test]
async fn test_sqlite_store_round_trip() {
  let store = SqliteStore::in_memory().await.unwrap();
  let resolver = InMemoryResolver::new();
  resolver.register(workflow_w(schema_v1())).await;
  let lifecycle = RunLifecycle::new(store, resolver);

  let valid = lifecycle
    .submit(&request(json!({ "x": 5 })), Strictness::Validated)
    .await
    .unwrap();
  let invalid = lifecycle
    .submit(&request(json!({ "x": "oops" })), Strictness::PossiblyInvalid)
    .await
    .unwrap();

  let ready = lifecycle.get_execution_info_or_error(&valid.run_id).await.unwrap();
  let info = ready.into_ready().unwrap();
  assert_eq!(info.run.run_id, valid.run_id);
  assert_eq!(info.run.execution_plan_snapshot, valid.execution_plan_snapshot);

  let failed = lifecycle.get_execution_info_or_error(&invalid.run_id).await.unwrap();
  assert!(matches!(failed, ExecutionInfoOutcome::InvalidConfig(_)));

  let stored = lifecycle.store().get_run(&invalid.run_id).await.unwrap().unwrap();
  assert_eq!(stored.status, Some(RunStatus::Failure));
  let events = lifecycle.store().events_for_run(&invalid.run_id).await.unwrap();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].error_kind(), Some(ErrorKind::InvalidConfig));
}
