//! Runway Workflow
//!
//! This crate provides the workflow definition the lifecycle layer reads
//! when it turns a request into a run. A definition is an immutable snapshot
//! of a workflow's step graph together with its versioned config schema.
//!
//! Key properties:
//! - Graph structure is validated on construction (unique steps, valid edges, no cycles)
//! - Every mode names a root config type that exists in the schema
//! - Step order is deterministic: topological, ties broken by declaration order
//! - Subset workflows keep a copy of the snapshot they were derived from

mod error;
mod graph;
mod snapshot;
mod workflow;

pub use error::WorkflowError;
pub use graph::Graph;
pub use snapshot::{Edge, ModeSnapshot, StepSnapshot, WorkflowSnapshot};
pub use workflow::WorkflowDefinition;
