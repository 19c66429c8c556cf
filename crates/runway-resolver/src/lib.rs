//! Runway Resolver
//!
//! Turns a workflow name, and optionally a step subset, into a validated
//! [`runway_workflow::WorkflowDefinition`]. Workflows come from JSON
//! documents on disk or from definitions registered in memory.

mod document;
mod error;
mod fs;
mod memory;
mod resolver;

pub use document::WorkflowDocument;
pub use error::ResolveError;
pub use fs::FsWorkflowResolver;
pub use memory::InMemoryResolver;
pub use resolver::WorkflowResolver;
