use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use runway_config::{ExecutionRequest, LifecycleSettings};
use runway_lifecycle::{ExecutionInfoOutcome, LifecycleError, RunLifecycle, Strictness};
use runway_resolver::FsWorkflowResolver;
use runway_store::{RunStore, SqliteStore, StepStatus};

type Lifecycle = RunLifecycle<SqliteStore, FsWorkflowResolver>;

/// Runway - Turns workflow run requests into validated, durable runs
#[derive(Parser)]
#[command(name = "runway")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.runway)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Create and inspect runs
  Run {
    #[command(subcommand)]
    action: RunAction,
  },
}

#[derive(Subcommand)]
enum RunAction {
  /// Create a run from an execution request
  Create {
    /// Path to the request file (JSON). Reads stdin when omitted.
    request_file: Option<PathBuf>,

    /// Record the run even if its config is invalid
    #[arg(long)]
    lenient: bool,
  },

  /// Re-validate a stored run and print it if it may execute
  Prepare {
    /// The run ID
    run_id: String,
  },

  /// Print a stored run
  Show {
    /// The run ID
    run_id: String,
  },

  /// Print a run's event log
  Events {
    /// The run ID
    run_id: String,
  },

  /// Record the outcome of one step, for resume/retry
  Step {
    /// The run ID
    run_id: String,

    /// The step key
    step_key: String,

    #[arg(value_enum)]
    status: StepOutcome,
  },
}

#[derive(Clone, Copy, ValueEnum)]
enum StepOutcome {
  Success,
  Failure,
  Skipped,
}

impl From<StepOutcome> for StepStatus {
  fn from(outcome: StepOutcome) -> Self {
    match outcome {
      StepOutcome::Success => StepStatus::Success,
      StepOutcome::Failure => StepStatus::Failure,
      StepOutcome::Skipped => StepStatus::Skipped,
    }
  }
}

fn main() -> Result<()> {
  init_tracing();
  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".runway"),
  };

  match cli.command {
    Some(Commands::Run { action }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(async { run_action(action, data_dir).await })?;
    }
    None => {
      println!("runway - use --help to see available commands");
    }
  }

  Ok(())
}

fn init_tracing() {
  let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .try_init();
}

async fn run_action(action: RunAction, data_dir: PathBuf) -> Result<()> {
  let lifecycle = open_lifecycle(&data_dir).await?;

  match action {
    RunAction::Create {
      request_file,
      lenient,
    } => create_run(&lifecycle, request_file, lenient).await,
    RunAction::Prepare { run_id } => prepare_run(&lifecycle, &run_id).await,
    RunAction::Show { run_id } => {
      let run = lifecycle
        .store()
        .get_run(&run_id)
        .await
        .context("failed to read run")?
        .with_context(|| format!("run '{}' not found", run_id))?;
      println!("{}", serde_json::to_string_pretty(&run)?);
      Ok(())
    }
    RunAction::Events { run_id } => {
      let events = lifecycle
        .store()
        .events_for_run(&run_id)
        .await
        .context("failed to read events")?;
      println!("{}", serde_json::to_string_pretty(&events)?);
      Ok(())
    }
    RunAction::Step {
      run_id,
      step_key,
      status,
    } => {
      lifecycle
        .store()
        .record_step_status(&run_id, &step_key, status.into())
        .await
        .with_context(|| format!("failed to record status of step '{}'", step_key))?;
      Ok(())
    }
  }
}

/// Wire the lifecycle to the data directory: workflows on disk, runs in SQLite.
async fn open_lifecycle(data_dir: &Path) -> Result<Lifecycle> {
  tokio::fs::create_dir_all(data_dir)
    .await
    .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

  let settings = load_settings(data_dir).await?;

  let db_path = data_dir.join("runway.db");
  let store = SqliteStore::open(&format!("sqlite://{}", db_path.display()))
    .await
    .with_context(|| format!("failed to open run database: {}", db_path.display()))?;

  let resolver = FsWorkflowResolver::new(data_dir.join("workflows"));

  Ok(RunLifecycle::new(store, resolver).with_settings(settings))
}

/// Read `runway.json` from the data directory, falling back to defaults.
async fn load_settings(data_dir: &Path) -> Result<LifecycleSettings> {
  let path = data_dir.join("runway.json");
  if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
    debug!(path = %path.display(), "no settings file, using defaults");
    return Ok(LifecycleSettings::default());
  }

  let content = tokio::fs::read_to_string(&path)
    .await
    .with_context(|| format!("failed to read settings file: {}", path.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse settings file: {}", path.display()))
}

async fn create_run(
  lifecycle: &Lifecycle,
  request_file: Option<PathBuf>,
  lenient: bool,
) -> Result<()> {
  let request = read_request(request_file).await?;
  let strictness = if lenient {
    Strictness::PossiblyInvalid
  } else {
    Strictness::Validated
  };

  let run = match lifecycle.submit(&request, strictness).await {
    Ok(run) => run,
    Err(LifecycleError::InvalidConfig {
      workflow, errors, ..
    }) => {
      for error in &errors {
        eprintln!("  {}", error);
      }
      bail!("invalid config for workflow '{}'", workflow);
    }
    Err(e) => return Err(e).context("failed to create run"),
  };

  if run.execution_plan_snapshot.is_none() {
    eprintln!("Run recorded with invalid config; it will not execute");
  }
  eprintln!("Created run: {}", run.run_id);
  println!("{}", serde_json::to_string_pretty(&run)?);

  Ok(())
}

async fn prepare_run(lifecycle: &Lifecycle, run_id: &str) -> Result<()> {
  let outcome = lifecycle
    .get_execution_info_or_error(run_id)
    .await
    .context("failed to load run")?;

  match outcome {
    ExecutionInfoOutcome::Ready(info) => {
      eprintln!(
        "Run {} is ready: {} step(s) of workflow '{}'",
        info.run.run_id,
        info.run.step_keys_to_execute.len(),
        info.workflow.name()
      );
      println!("{}", serde_json::to_string_pretty(&info.run)?);
      Ok(())
    }
    ExecutionInfoOutcome::RunNotFound { run_id } => bail!("run '{}' not found", run_id),
    ExecutionInfoOutcome::InvalidConfig(invalid) => {
      for error in &invalid.errors {
        eprintln!("  {}", error);
      }
      bail!(
        "config for run '{}' is no longer valid for workflow '{}'; run marked failed",
        run_id,
        invalid.workflow.name()
      )
    }
  }
}

async fn read_request(request_file: Option<PathBuf>) -> Result<ExecutionRequest> {
  let content = match request_file {
    Some(path) => tokio::fs::read_to_string(&path)
      .await
      .with_context(|| format!("failed to read request file: {}", path.display()))?,
    None => {
      let mut input = String::new();
      io::stdin()
        .read_to_string(&mut input)
        .context("failed to read request from stdin")?;
      input
    }
  };

  serde_json::from_str(&content).context("failed to parse execution request")
}
