use chrono::Utc;
use tracing::{debug, info, warn};

use runway_config::{ExecutionRequest, LifecycleSettings, RunIdPolicy, merge_tags};
use runway_plan::{PlanCompiler, StandardPlanCompiler};
use runway_resolver::WorkflowResolver;
use runway_store::{DiagnosticEvent, RunRecord, RunStatus, RunStore, make_new_run_id};
use runway_validator::{ConfigValidator, SchemaValidator, ValidationResult};
use runway_workflow::WorkflowDefinition;

use crate::error::LifecycleError;
use crate::outcome::{ConfigValidationInvalid, ExecutionInfo, ExecutionInfoOutcome};
use crate::selection::{StepSelection, resolve_step_keys};

/// How a creation path treats a configuration that fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
  /// Reject the request before anything is persisted.
  Validated,
  /// Persist the run anyway, without an execution plan and with no status.
  PossiblyInvalid,
}

/// Orchestrates run creation and the pre-execution check of stored runs.
///
/// Holds no mutable state of its own. All collaborators are injected:
/// use `RunLifecycle::new()` for the default validator and plan compiler,
/// or `RunLifecycle::with_components()` to provide your own.
pub struct RunLifecycle<S, R, V = SchemaValidator, C = StandardPlanCompiler> {
  store: S,
  resolver: R,
  validator: V,
  compiler: C,
  settings: LifecycleSettings,
}

impl<S, R> RunLifecycle<S, R>
where
  S: RunStore,
  R: WorkflowResolver,
{
  /// Create a lifecycle with the schema validator, the standard plan compiler
  /// and default settings.
  pub fn new(store: S, resolver: R) -> Self {
    Self::with_components(
      store,
      resolver,
      SchemaValidator::new(),
      StandardPlanCompiler::new(),
      LifecycleSettings::default(),
    )
  }
}

impl<S, R, V, C> RunLifecycle<S, R, V, C>
where
  S: RunStore,
  R: WorkflowResolver,
  V: ConfigValidator,
  C: PlanCompiler,
{
  pub fn with_components(
    store: S,
    resolver: R,
    validator: V,
    compiler: C,
    settings: LifecycleSettings,
  ) -> Self {
    Self {
      store,
      resolver,
      validator,
      compiler,
      settings,
    }
  }

  /// Replace the settings.
  pub fn with_settings(mut self, settings: LifecycleSettings) -> Self {
    self.settings = settings;
    self
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  pub fn resolver(&self) -> &R {
    &self.resolver
  }

  pub fn settings(&self) -> &LifecycleSettings {
    &self.settings
  }

  /// Create a run whose configuration must be valid.
  ///
  /// Invalid configuration returns `LifecycleError::InvalidConfig` and the
  /// store is never written.
  pub async fn create_validated_run(
    &self,
    request: &ExecutionRequest,
    workflow: &WorkflowDefinition,
  ) -> Result<RunRecord, LifecycleError> {
    self.create_run(request, workflow, Strictness::Validated).await
  }

  /// Create a run that must exist whatever its configuration.
  ///
  /// The returned record has no execution plan when the configuration was
  /// invalid or the step selection could not be resolved, and is then not
  /// executable.
  pub async fn create_possibly_invalid_run(
    &self,
    request: &ExecutionRequest,
    workflow: &WorkflowDefinition,
  ) -> Result<RunRecord, LifecycleError> {
    self
      .create_run(request, workflow, Strictness::PossiblyInvalid)
      .await
  }

  /// Resolve the request's workflow through the resolver, then create the run.
  pub async fn submit(
    &self,
    request: &ExecutionRequest,
    strictness: Strictness,
  ) -> Result<RunRecord, LifecycleError> {
    let workflow = self
      .resolver
      .resolve(
        &request.selector.name,
        request.selector.step_subset.as_deref(),
      )
      .await?;
    self.create_run(request, &workflow, strictness).await
  }

  /// Create a run for `request` against `workflow`.
  ///
  /// Validates the configuration, selects the steps to execute, compiles a
  /// plan when the configuration is valid, then persists the record with a
  /// single store write.
  pub async fn create_run(
    &self,
    request: &ExecutionRequest,
    workflow: &WorkflowDefinition,
    strictness: Strictness,
  ) -> Result<RunRecord, LifecycleError> {
    let root_key = workflow.root_config_key_for_mode(&request.mode)?;

    let normalized = match self
      .validator
      .validate(workflow.config_schema(), root_key, &request.config)
    {
      ValidationResult::Valid(normalized) => Some(normalized),
      ValidationResult::Invalid(errors) => match strictness {
        Strictness::Validated => {
          warn!(
            workflow = workflow.name(),
            mode = %request.mode,
            errors = errors.len(),
            "rejected run request with invalid config"
          );
          return Err(LifecycleError::InvalidConfig {
            workflow: workflow.name().to_string(),
            mode: request.mode.clone(),
            errors,
          });
        }
        Strictness::PossiblyInvalid => {
          debug!(
            workflow = workflow.name(),
            mode = %request.mode,
            errors = errors.len(),
            "recording run with invalid config"
          );
          None
        }
      },
    };

    let selected = match StepSelection::for_request(request) {
      Ok(selection) => resolve_step_keys(&self.store, workflow, &selection).await,
      Err(e) => Err(e.into()),
    };
    let (step_keys, normalized) = match selected {
      Ok(step_keys) => (step_keys, normalized),
      // A lenient run is recorded with the requested keys as given, and no plan
      Err(LifecycleError::Selection(error)) if strictness == Strictness::PossiblyInvalid => {
        debug!(
          workflow = workflow.name(),
          error = %error,
          "recording run with unresolvable step selection"
        );
        (request.step_keys.clone().unwrap_or_default(), None)
      }
      Err(e) => return Err(e),
    };

    let execution_plan_snapshot = normalized
      .map(|config| {
        self
          .compiler
          .compile(workflow, &request.mode, &config, &step_keys)
      })
      .transpose()?;

    let run_id = self
      .run_id_policy(strictness)
      .accept(request.metadata.run_id.as_deref())
      .map(str::to_string)
      .unwrap_or_else(make_new_run_id);

    let status = match strictness {
      Strictness::Validated => Some(RunStatus::NotStarted),
      Strictness::PossiblyInvalid => None,
    };

    let now = Utc::now();
    let record = RunRecord {
      run_id,
      workflow_name: workflow.name().to_string(),
      step_subset: workflow.step_subset().map(<[String]>::to_vec),
      config: request.config.clone(),
      mode: request.mode.clone(),
      step_keys_to_execute: step_keys,
      status,
      tags: merge_tags(workflow.tags(), &request.metadata.tags),
      root_run_id: request.metadata.root_run_id.clone(),
      parent_run_id: request.metadata.parent_run_id.clone(),
      workflow_snapshot: workflow.snapshot().clone(),
      execution_plan_snapshot,
      parent_workflow_snapshot: workflow.parent_snapshot().cloned(),
      created_at: now,
      updated_at: now,
    };

    let run = self.store.create_run(&record).await?;
    info!(
      run_id = %run.run_id,
      workflow = %run.workflow_name,
      mode = %run.mode,
      steps = run.step_keys_to_execute.len(),
      planned = run.execution_plan_snapshot.is_some(),
      "created run"
    );
    Ok(run)
  }

  /// Look up a previously created run and re-validate its configuration
  /// against the workflow's current schema.
  ///
  /// The run may have been created by either path, possibly in another
  /// process. When the configuration no longer passes, a diagnostic event is
  /// appended and the run is marked failed, as one store operation, before
  /// `InvalidConfig` is returned.
  pub async fn get_execution_info_or_error(
    &self,
    run_id: &str,
  ) -> Result<ExecutionInfoOutcome, LifecycleError> {
    let Some(run) = self.store.get_run(run_id).await? else {
      debug!(run_id, "run not found");
      return Ok(ExecutionInfoOutcome::RunNotFound {
        run_id: run_id.to_string(),
      });
    };

    let workflow = self
      .resolver
      .resolve(&run.workflow_name, run.step_subset.as_deref())
      .await?;
    let root_key = workflow.root_config_key_for_mode(&run.mode)?;

    match self
      .validator
      .validate(workflow.config_schema(), root_key, &run.config)
    {
      ValidationResult::Valid(_) => {
        Ok(ExecutionInfoOutcome::Ready(ExecutionInfo { workflow, run }))
      }
      ValidationResult::Invalid(errors) => {
        let event =
          DiagnosticEvent::invalid_config(run.run_id.as_str(), workflow.name(), errors.clone());
        self.store.fail_run_with_event(&run.run_id, &event).await?;
        warn!(
          run_id = %run.run_id,
          workflow = workflow.name(),
          errors = errors.len(),
          "stored run config is invalid, run marked failed"
        );
        Ok(ExecutionInfoOutcome::InvalidConfig(ConfigValidationInvalid {
          workflow,
          errors,
        }))
      }
    }
  }

  fn run_id_policy(&self, strictness: Strictness) -> RunIdPolicy {
    match strictness {
      Strictness::Validated => self.settings.validated_run_ids,
      Strictness::PossiblyInvalid => self.settings.possibly_invalid_run_ids,
    }
  }
}
