//! Runway Lifecycle
//!
//! This crate decides whether and how a run begins to exist. It is the single
//! point where an untrusted execution request (a configuration document, a
//! mode, an optional step subset) is reconciled against a versioned workflow
//! definition before any executor may touch it.
//!
//! Two creation paths share one operation, [`RunLifecycle::create_run`],
//! distinguished by [`Strictness`]:
//! - `Validated`: invalid configuration aborts before anything is persisted
//! - `PossiblyInvalid`: a record is always persisted, without a plan when the
//!   configuration is invalid
//!
//! [`RunLifecycle::get_execution_info_or_error`] re-validates a stored run
//! before it is handed to an executor and records a diagnostic plus a failure
//! transition when its configuration no longer passes.

mod error;
mod lifecycle;
mod outcome;
mod selection;

pub use error::{LifecycleError, SelectionError};
pub use lifecycle::{RunLifecycle, Strictness};
pub use outcome::{ConfigValidationInvalid, ExecutionInfo, ExecutionInfoOutcome};
pub use selection::{StepSelection, resolve_step_keys};
