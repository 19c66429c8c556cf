use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Type keys every schema understands without declaring them.
pub const BUILTIN_SCALARS: [&str; 5] = ["Any", "Bool", "Int", "Float", "String"];

/// A field of a shape, permissive shape, or selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
  pub type_key: String,
  #[serde(default = "default_true")]
  pub is_required: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default_value: Option<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

fn default_true() -> bool {
  true
}

impl ConfigField {
  pub fn required(type_key: impl Into<String>) -> Self {
    Self {
      type_key: type_key.into(),
      is_required: true,
      default_value: None,
      description: None,
    }
  }

  pub fn optional(type_key: impl Into<String>) -> Self {
    Self {
      is_required: false,
      ..Self::required(type_key)
    }
  }

  pub fn with_default(type_key: impl Into<String>, default_value: serde_json::Value) -> Self {
    Self {
      is_required: false,
      default_value: Some(default_value),
      ..Self::required(type_key)
    }
  }

  /// A field must be supplied only when it is required and has no default.
  pub fn must_be_supplied(&self) -> bool {
    self.is_required && self.default_value.is_none()
  }
}

/// A config type in a schema snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigType {
  Any,
  Bool,
  Int,
  Float,
  String,
  Array { inner: String },
  /// `null` or a value of the inner type.
  Noneable { inner: String },
  Enum { values: Vec<String> },
  /// A mapping with a fixed set of fields.
  Shape { fields: BTreeMap<String, ConfigField> },
  /// Like a shape, but undeclared keys are passed through untouched.
  Permissive { fields: BTreeMap<String, ConfigField> },
  /// A mapping with exactly one of the declared fields.
  Selector { fields: BTreeMap<String, ConfigField> },
}

impl ConfigType {
  /// Short name used in error messages.
  pub fn describe(&self) -> &'static str {
    match self {
      ConfigType::Any => "Any",
      ConfigType::Bool => "Bool",
      ConfigType::Int => "Int",
      ConfigType::Float => "Float",
      ConfigType::String => "String",
      ConfigType::Array { .. } => "Array",
      ConfigType::Noneable { .. } => "Noneable",
      ConfigType::Enum { .. } => "Enum",
      ConfigType::Shape { .. } => "Shape",
      ConfigType::Permissive { .. } => "Permissive",
      ConfigType::Selector { .. } => "Selector",
    }
  }

  /// Type keys this type refers to.
  pub fn references(&self) -> Vec<&str> {
    match self {
      ConfigType::Array { inner } | ConfigType::Noneable { inner } => vec![inner.as_str()],
      ConfigType::Shape { fields }
      | ConfigType::Permissive { fields }
      | ConfigType::Selector { fields } => fields.values().map(|f| f.type_key.as_str()).collect(),
      _ => Vec::new(),
    }
  }

  fn builtin(key: &str) -> Option<&'static ConfigType> {
    static ANY: ConfigType = ConfigType::Any;
    static BOOL: ConfigType = ConfigType::Bool;
    static INT: ConfigType = ConfigType::Int;
    static FLOAT: ConfigType = ConfigType::Float;
    static STRING: ConfigType = ConfigType::String;
    match key {
      "Any" => Some(&ANY),
      "Bool" => Some(&BOOL),
      "Int" => Some(&INT),
      "Float" => Some(&FLOAT),
      "String" => Some(&STRING),
      _ => None,
    }
  }
}

/// Versioned table of config types for one workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSchemaSnapshot {
  #[serde(default)]
  pub version: u32,
  #[serde(default)]
  pub types: BTreeMap<String, ConfigType>,
}

impl ConfigSchemaSnapshot {
  pub fn new(version: u32) -> Self {
    Self {
      version,
      types: BTreeMap::new(),
    }
  }

  /// Builder-style insert, mostly for fixtures.
  pub fn with_type(mut self, key: impl Into<String>, config_type: ConfigType) -> Self {
    self.types.insert(key.into(), config_type);
    self
  }

  /// Look up a type by key. Declared types shadow the built-in scalars.
  pub fn get(&self, key: &str) -> Option<&ConfigType> {
    self.types.get(key).or_else(|| ConfigType::builtin(key))
  }

  pub fn contains(&self, key: &str) -> bool {
    self.get(key).is_some()
  }

  /// Check that every referenced type exists and that no chain of noneable
  /// types loops back on itself.
  pub fn check(&self) -> Result<(), SchemaError> {
    for (type_key, config_type) in &self.types {
      if let Some(reference) = config_type
        .references()
        .into_iter()
        .find(|reference| !self.contains(reference))
      {
        return Err(SchemaError::UnknownReference {
          type_key: type_key.clone(),
          reference: reference.to_string(),
        });
      }
    }

    for type_key in self.types.keys() {
      let mut seen = HashSet::new();
      let mut current = type_key.as_str();
      while let Some(ConfigType::Noneable { inner }) = self.get(current) {
        if !seen.insert(current) {
          return Err(SchemaError::NoneableCycle(type_key.clone()));
        }
        current = inner.as_str();
      }
    }

    Ok(())
  }
}
