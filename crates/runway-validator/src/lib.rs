//! Runway Validator
//!
//! Validates run configuration documents against a workflow's config schema
//! snapshot.
//!
//! A schema snapshot is a flat table of named config types. Composite types
//! (shapes, arrays, selectors) refer to other types by key, and each workflow
//! mode names the root type its configuration must satisfy:
//!
//! ```json
//! {
//!   "version": 1,
//!   "types": {
//!     "Default.Root": {
//!       "kind": "shape",
//!       "fields": {
//!         "x": { "type_key": "Int" },
//!         "label": { "type_key": "String", "is_required": false, "default_value": "none" }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Validation never stops at the first problem: every mismatch is reported as
//! a structured [`ValidationError`] carrying the path to the offending value.

mod error;
mod schema;
mod validator;

pub use error::{ErrorReason, SchemaError, ValidationError};
pub use schema::{BUILTIN_SCALARS, ConfigField, ConfigSchemaSnapshot, ConfigType};
pub use validator::{ConfigValidator, SchemaValidator, ValidationResult};
