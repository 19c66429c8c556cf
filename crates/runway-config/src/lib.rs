//! Runway Config
//!
//! This crate contains the serializable types a client submits to ask for a
//! workflow run, plus the settings that tune how the lifecycle layer turns
//! those requests into run records.
//!
//! Requests can be loaded from:
//! - JSON files (via the CLI with `runway run create request.json`)
//! - An upstream request-handling layer that builds them directly
//!
//! Nothing here is validated. Configuration documents stay untyped
//! (`serde_json::Value`) until they are checked against a workflow's
//! config schema.

mod request;
mod settings;
mod tags;

pub use request::{ExecutionMetadata, ExecutionRequest, WorkflowSelector};
pub use settings::{LifecycleSettings, RunIdPolicy};
pub use tags::{RESUME_RETRY_TAG, Tags, merge_tags};
