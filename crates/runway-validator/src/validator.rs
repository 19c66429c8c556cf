use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{ErrorReason, ValidationError};
use crate::schema::{ConfigField, ConfigSchemaSnapshot, ConfigType};

/// Outcome of validating one configuration document.
///
/// Produced fresh per call and never cached.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
  /// The document is valid. Holds the normalized document (defaults applied).
  Valid(Value),
  /// The document is invalid. Never empty.
  Invalid(Vec<ValidationError>),
}

impl ValidationResult {
  pub fn is_success(&self) -> bool {
    matches!(self, ValidationResult::Valid(_))
  }

  pub fn normalized(&self) -> Option<&Value> {
    match self {
      ValidationResult::Valid(value) => Some(value),
      ValidationResult::Invalid(_) => None,
    }
  }

  pub fn errors(&self) -> &[ValidationError] {
    match self {
      ValidationResult::Valid(_) => &[],
      ValidationResult::Invalid(errors) => errors,
    }
  }
}

/// Validates a configuration document against a schema snapshot.
pub trait ConfigValidator: Send + Sync {
  /// Validate `config` against the type named `root_key` in `schema`.
  fn validate(&self, schema: &ConfigSchemaSnapshot, root_key: &str, config: &Value)
  -> ValidationResult;
}

/// Structural validator for [`ConfigSchemaSnapshot`] types.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
  pub fn new() -> Self {
    Self
  }
}

impl ConfigValidator for SchemaValidator {
  fn validate(
    &self,
    schema: &ConfigSchemaSnapshot,
    root_key: &str,
    config: &Value,
  ) -> ValidationResult {
    let mut walker = Walker {
      schema,
      path: Vec::new(),
      errors: Vec::new(),
      unconsumed: Vec::new(),
    };
    let normalized = walker.visit(root_key, config);

    if walker.errors.is_empty() {
      ValidationResult::Valid(normalized)
    } else {
      ValidationResult::Invalid(walker.errors)
    }
  }
}

/// Recursive descent over a document, collecting every error it finds.
struct Walker<'a> {
  schema: &'a ConfigSchemaSnapshot,
  path: Vec<String>,
  errors: Vec<ValidationError>,
  /// Type/value pairs entered since the walk last stepped into the document.
  unconsumed: Vec<(String, Value)>,
}

impl Walker<'_> {
  fn visit(&mut self, type_key: &str, value: &Value) -> Value {
    let schema = self.schema;
    let Some(config_type) = schema.get(type_key) else {
      self.error(
        ErrorReason::UnknownTypeKey,
        format!("schema does not define type \"{}\"", type_key),
      );
      return Value::Null;
    };

    match config_type {
      ConfigType::Any => value.clone(),
      ConfigType::Bool => self.scalar(config_type, value, Value::is_boolean),
      ConfigType::Int => self.scalar(config_type, value, |v| v.is_i64() || v.is_u64()),
      ConfigType::Float => self.scalar(config_type, value, Value::is_number),
      ConfigType::String => self.scalar(config_type, value, Value::is_string),
      ConfigType::Array { inner } => self.visit_array(inner, value),
      ConfigType::Noneable { inner } => {
        if value.is_null() {
          Value::Null
        } else {
          self.revisit(inner, value)
        }
      }
      ConfigType::Enum { values } => self.visit_enum(values, value),
      ConfigType::Shape { fields } => self.visit_fields(fields, value, false),
      ConfigType::Permissive { fields } => self.visit_fields(fields, value, true),
      ConfigType::Selector { fields } => self.visit_selector(fields, value),
    }
  }

  /// Visit a child of the current value.
  fn descend(&mut self, type_key: &str, value: &Value) -> Value {
    let unconsumed = std::mem::take(&mut self.unconsumed);
    let visited = self.visit(type_key, value);
    self.unconsumed = unconsumed;
    visited
  }

  /// Visit a value without stepping into the document: a noneable's inner
  /// type or a default. Entering the same pair twice would never terminate.
  fn revisit(&mut self, type_key: &str, value: &Value) -> Value {
    if self
      .unconsumed
      .iter()
      .any(|(key, seen)| key == type_key && seen == value)
    {
      self.error(
        ErrorReason::RecursiveType,
        format!(
          "type \"{}\" at {} refers back to itself",
          type_key,
          self.render_path()
        ),
      );
      return Value::Null;
    }

    self.unconsumed.push((type_key.to_string(), value.clone()));
    let visited = self.visit(type_key, value);
    self.unconsumed.pop();
    visited
  }

  fn scalar(&mut self, config_type: &ConfigType, value: &Value, accepts: fn(&Value) -> bool) -> Value {
    if !accepts(value) {
      self.mismatch(config_type.describe(), value);
    }
    value.clone()
  }

  fn visit_array(&mut self, inner: &str, value: &Value) -> Value {
    let Some(items) = value.as_array() else {
      self.mismatch("Array", value);
      return value.clone();
    };

    let mut normalized = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
      self.path.push(format!("[{}]", index));
      normalized.push(self.descend(inner, item));
      self.path.pop();
    }
    Value::Array(normalized)
  }

  fn visit_enum(&mut self, values: &[String], value: &Value) -> Value {
    match value.as_str() {
      Some(text) if values.iter().any(|allowed| allowed == text) => {}
      Some(text) => self.error(
        ErrorReason::EnumValueNotFound,
        format!(
          "value \"{}\" at {} is not one of [{}]",
          text,
          self.render_path(),
          values.join(", ")
        ),
      ),
      None => self.mismatch("Enum", value),
    }
    value.clone()
  }

  fn visit_fields(
    &mut self,
    fields: &BTreeMap<String, ConfigField>,
    value: &Value,
    permissive: bool,
  ) -> Value {
    let empty = Map::new();
    let entries = match value {
      Value::Object(entries) => entries,
      Value::Null => &empty,
      other => {
        self.mismatch("a mapping", other);
        return other.clone();
      }
    };

    let mut normalized = Map::new();

    for (key, entry) in entries {
      self.path.push(key.clone());
      match fields.get(key) {
        Some(field) => {
          let visited = self.descend(&field.type_key, entry);
          normalized.insert(key.clone(), visited);
        }
        None if permissive => {
          normalized.insert(key.clone(), entry.clone());
        }
        None => self.error(
          ErrorReason::FieldNotDefined,
          format!("received unexpected config entry \"{}\" at {}", key, self.render_path()),
        ),
      }
      self.path.pop();
    }

    for (name, field) in fields {
      if entries.contains_key(name) {
        continue;
      }
      self.path.push(name.clone());
      if field.must_be_supplied() {
        self.error(
          ErrorReason::MissingRequiredField,
          format!(
            "missing required field \"{}\" of type {} at {}",
            name,
            field.type_key,
            self.render_path()
          ),
        );
      } else if let Some(default_value) = &field.default_value {
        let visited = self.revisit(&field.type_key, default_value);
        normalized.insert(name.clone(), visited);
      }
      self.path.pop();
    }

    Value::Object(normalized)
  }

  fn visit_selector(&mut self, fields: &BTreeMap<String, ConfigField>, value: &Value) -> Value {
    let empty = Map::new();
    let entries = match value {
      Value::Object(entries) => entries,
      Value::Null => &empty,
      other => {
        self.mismatch("a single-entry mapping", other);
        return other.clone();
      }
    };

    if entries.is_empty() {
      // A lone field with a default can be selected implicitly.
      if let [(name, field)] = fields.iter().collect::<Vec<_>>().as_slice()
        && let Some(default_value) = &field.default_value
      {
        self.path.push((*name).clone());
        let visited = self.revisit(&field.type_key, default_value);
        self.path.pop();
        let mut normalized = Map::new();
        normalized.insert((*name).clone(), visited);
        return Value::Object(normalized);
      }
    }

    if entries.len() != 1 {
      let names: Vec<&str> = fields.keys().map(String::as_str).collect();
      self.error(
        ErrorReason::SelectorFieldError,
        format!(
          "must specify exactly one of [{}] at {}, got {}",
          names.join(", "),
          self.render_path(),
          entries.len()
        ),
      );
      return value.clone();
    }

    let mut normalized = Map::new();
    for (key, entry) in entries {
      self.path.push(key.clone());
      match fields.get(key) {
        Some(field) => {
          let visited = self.descend(&field.type_key, entry);
          normalized.insert(key.clone(), visited);
        }
        None => self.error(
          ErrorReason::FieldNotDefined,
          format!("selector has no option \"{}\" at {}", key, self.render_path()),
        ),
      }
      self.path.pop();
    }
    Value::Object(normalized)
  }

  fn mismatch(&mut self, expected: &str, value: &Value) {
    self.error(
      ErrorReason::RuntimeTypeMismatch,
      format!(
        "invalid value {} at {}: expected {}, got {}",
        value,
        self.render_path(),
        expected,
        json_kind(value)
      ),
    );
  }

  fn error(&mut self, reason: ErrorReason, message: String) {
    self
      .errors
      .push(ValidationError::new(reason, &self.path, message));
  }

  fn render_path(&self) -> String {
    ValidationError::new(ErrorReason::RuntimeTypeMismatch, &self.path, "").path_string()
  }
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(n) if n.is_f64() => "a float",
    Value::Number(_) => "an integer",
    Value::String(_) => "a string",
    Value::Array(_) => "a list",
    Value::Object(_) => "a mapping",
  }
}
