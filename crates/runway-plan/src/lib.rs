//! Runway Plan
//!
//! Compiles a workflow, a mode, a validated configuration document and a set
//! of step keys into an immutable [`ExecutionPlanSnapshot`]: the exact step
//! DAG a run will execute.
//!
//! Compilation is pure and deterministic. The same inputs always produce a
//! snapshot with the same content id.

mod compiler;
mod error;
mod snapshot;

pub use compiler::{PlanCompiler, StandardPlanCompiler};
pub use error::PlanError;
pub use snapshot::{ExecutionPlanSnapshot, PlannedStep};
