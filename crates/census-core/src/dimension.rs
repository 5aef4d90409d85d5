//! Dimensions — typed key/value attributes attached to instance records.
//!
//! A type record declares which dimension keys its instances may carry and
//! what data type each value must have. Instances submit loose JSON values;
//! [`validate_dimensions`] performs an explicit parse-and-tag step, turning
//! each value into a [`DimensionValue`] or collecting an error message. All
//! errors are gathered before the call fails, so a caller sees every problem
//! in one round trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Data types ──────────────────────────────────────────────────────────────

/// The declared value type of a dimension.
///
/// Unrecognized strings are preserved verbatim rather than rejected at
/// deserialization time; the validator reports them against the dimensions
/// that reference them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
  String,
  Boolean,
  Number,
  Date,
  Other(String),
}

impl From<String> for DataType {
  fn from(s: String) -> Self {
    match s.as_str() {
      "string" => Self::String,
      "boolean" => Self::Boolean,
      "number" => Self::Number,
      "date" => Self::Date,
      _ => Self::Other(s),
    }
  }
}

impl From<DataType> for String {
  fn from(d: DataType) -> Self {
    match d {
      DataType::String => "string".to_owned(),
      DataType::Boolean => "boolean".to_owned(),
      DataType::Number => "number".to_owned(),
      DataType::Date => "date".to_owned(),
      DataType::Other(s) => s,
    }
  }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

/// One entry in a type's dimension schema list. The list is embedded on the
/// owning type record and replaced wholesale whenever the type is saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionSchema {
  /// Unique within the owning type's schema list.
  pub key:         String,
  /// Display name for admin clients.
  pub name:        String,
  pub data_type:   DataType,
  /// Free-text unit label, e.g. "kg" or "years".
  pub data_unit:   Option<String>,
  #[serde(default)]
  pub is_required: bool,
}

/// Reject schema lists that declare the same key twice.
pub fn validate_schema_list(
  schemas: &[DimensionSchema],
) -> Result<(), ValidationError> {
  let mut seen = std::collections::BTreeSet::new();
  let mut errors = Vec::new();
  for schema in schemas {
    if !seen.insert(schema.key.as_str()) {
      errors
        .push(format!("Duplicate dimension schema key: '{}'", schema.key));
    }
  }
  if errors.is_empty() {
    Ok(())
  } else {
    Err(ValidationError { messages: errors })
  }
}

// ─── Values ──────────────────────────────────────────────────────────────────

/// A parsed, tagged dimension value as persisted on instance rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DimensionValue {
  String(String),
  Number(f64),
  Bool(bool),
  Date(DateTime<Utc>),
}

/// A dimension as submitted by a caller: the value is still loose JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionInput {
  pub key:   String,
  pub value: serde_json::Value,
}

/// A validated dimension attached to an instance record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
  pub key:   String,
  pub value: DimensionValue,
}

impl DimensionValue {
  /// The loose JSON form of a tagged value. Re-validating it under the same
  /// schema parses back to the identical tagged value.
  pub fn to_json_value(&self) -> serde_json::Value {
    match self {
      Self::String(s) => serde_json::Value::String(s.clone()),
      Self::Number(n) => serde_json::json!(n),
      Self::Bool(b) => serde_json::Value::Bool(*b),
      Self::Date(dt) => serde_json::Value::String(dt.to_rfc3339()),
    }
  }
}

impl Dimension {
  /// Back-convert a stored dimension into submission form, used when a
  /// partial update keeps the stored dimensions but the schema they are
  /// validated against may have changed.
  pub fn to_input(&self) -> DimensionInput {
    DimensionInput { key: self.key.clone(), value: self.value.to_json_value() }
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// The combined outcome of a failed validation pass. Individual messages are
/// retained for structured error responses; `Display` joins them.
#[derive(Debug, Clone, Error)]
#[error("{}", .messages.join("; "))]
pub struct ValidationError {
  pub messages: Vec<String>,
}

/// Validate submitted dimensions against a type's schema list.
///
/// Checks, in order: all `is_required` keys are present; every submitted key
/// is declared; every value parses under its schema's data type. Errors are
/// collected, not short-circuited. On success the parsed dimensions are
/// returned in submission order.
pub fn validate_dimensions(
  inputs: &[DimensionInput],
  schemas: &[DimensionSchema],
) -> Result<Vec<Dimension>, ValidationError> {
  let mut errors = Vec::new();

  let missing: Vec<&str> = schemas
    .iter()
    .filter(|s| s.is_required)
    .filter(|s| !inputs.iter().any(|d| d.key == s.key))
    .map(|s| s.key.as_str())
    .collect();
  if !missing.is_empty() {
    errors.push(format!("Missing required fields: {}", missing.join(", ")));
  }

  let mut parsed = Vec::with_capacity(inputs.len());
  for input in inputs {
    let Some(schema) = schemas.iter().find(|s| s.key == input.key) else {
      errors.push(format!("Unexpected dimension key: '{}'", input.key));
      continue;
    };
    match parse_value(&input.value, &schema.data_type) {
      Ok(value) => parsed.push(Dimension { key: input.key.clone(), value }),
      Err(message) => errors.push(message),
    }
  }

  if errors.is_empty() {
    Ok(parsed)
  } else {
    Err(ValidationError { messages: errors })
  }
}

/// Parse one loose value under a declared data type, or produce the error
/// message for it.
fn parse_value(
  value: &serde_json::Value,
  data_type: &DataType,
) -> Result<DimensionValue, String> {
  match data_type {
    DataType::String => match value {
      serde_json::Value::String(s) => Ok(DimensionValue::String(s.clone())),
      other => Err(type_mismatch("string", other)),
    },
    DataType::Boolean => match value {
      serde_json::Value::Bool(b) => Ok(DimensionValue::Bool(*b)),
      serde_json::Value::String(s) if s == "true" => {
        Ok(DimensionValue::Bool(true))
      }
      serde_json::Value::String(s) if s == "false" => {
        Ok(DimensionValue::Bool(false))
      }
      other => Err(type_mismatch("boolean", other)),
    },
    DataType::Number => match value {
      serde_json::Value::Number(n) => match n.as_f64() {
        Some(f) if f.is_finite() => Ok(DimensionValue::Number(f)),
        _ => Err(type_mismatch("number", value)),
      },
      // Numeric strings are accepted, but only when the whole string is a
      // number. No implicit coercion of "" or "abc".
      serde_json::Value::String(s) => match s.trim().parse::<f64>() {
        Ok(f) if f.is_finite() && !s.trim().is_empty() => {
          Ok(DimensionValue::Number(f))
        }
        _ => Err(type_mismatch("number", value)),
      },
      other => Err(type_mismatch("number", other)),
    },
    DataType::Date => match value {
      serde_json::Value::String(s) => {
        match DateTime::parse_from_rfc3339(s) {
          Ok(dt) => Ok(DimensionValue::Date(dt.with_timezone(&Utc))),
          Err(_) => Err(type_mismatch("date", value)),
        }
      }
      other => Err(type_mismatch("date", other)),
    },
    DataType::Other(raw) => Err(format!("Unknown data type: '{raw}'")),
  }
}

fn type_mismatch(expected: &str, got: &serde_json::Value) -> String {
  let rendered = match got {
    serde_json::Value::String(s) => s.clone(),
    other => other.to_string(),
  };
  format!("Expected {expected} but got '{rendered}'")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn schema(key: &str, data_type: DataType, required: bool) -> DimensionSchema {
    DimensionSchema {
      key:         key.to_owned(),
      name:        key.to_owned(),
      data_type,
      data_unit:   None,
      is_required: required,
    }
  }

  fn input(key: &str, value: serde_json::Value) -> DimensionInput {
    DimensionInput { key: key.to_owned(), value }
  }

  #[test]
  fn empty_inputs_pass_when_nothing_is_required() {
    let schemas = vec![schema("age", DataType::Number, false)];
    assert!(validate_dimensions(&[], &schemas).unwrap().is_empty());
  }

  #[test]
  fn missing_required_keys_are_listed_together() {
    let schemas = vec![
      schema("age", DataType::Number, true),
      schema("name", DataType::String, true),
      schema("note", DataType::String, false),
    ];
    let err = validate_dimensions(&[], &schemas).unwrap_err();
    assert_eq!(err.messages, vec!["Missing required fields: age, name"]);
  }

  #[test]
  fn unexpected_keys_are_rejected() {
    let schemas = vec![schema("age", DataType::Number, false)];
    let err =
      validate_dimensions(&[input("height", json!(180))], &schemas)
        .unwrap_err();
    assert_eq!(err.messages, vec!["Unexpected dimension key: 'height'"]);
  }

  #[test]
  fn non_numeric_string_fails_number_check() {
    let schemas = vec![schema("age", DataType::Number, true)];
    let err =
      validate_dimensions(&[input("age", json!("abc"))], &schemas)
        .unwrap_err();
    assert_eq!(err.to_string(), "Expected number but got 'abc'");
  }

  #[test]
  fn numeric_string_parses_strictly() {
    let schemas = vec![schema("age", DataType::Number, true)];
    let dims =
      validate_dimensions(&[input("age", json!("42"))], &schemas).unwrap();
    assert_eq!(dims[0].value, DimensionValue::Number(42.0));

    for bad in ["", "  ", "12 monkeys"] {
      assert!(validate_dimensions(&[input("age", json!(bad))], &schemas)
        .is_err());
    }
  }

  #[test]
  fn booleans_accept_bool_and_bool_strings() {
    let schemas = vec![schema("active", DataType::Boolean, true)];
    for (value, expected) in [
      (json!(true), true),
      (json!("true"), true),
      (json!("false"), false),
    ] {
      let dims =
        validate_dimensions(&[input("active", value)], &schemas).unwrap();
      assert_eq!(dims[0].value, DimensionValue::Bool(expected));
    }
    assert!(
      validate_dimensions(&[input("active", json!("yes"))], &schemas)
        .is_err()
    );
  }

  #[test]
  fn dates_parse_as_rfc3339_utc() {
    let schemas = vec![schema("seen", DataType::Date, true)];
    let dims = validate_dimensions(
      &[input("seen", json!("2024-03-01T12:00:00Z"))],
      &schemas,
    )
    .unwrap();
    assert!(matches!(dims[0].value, DimensionValue::Date(_)));

    let err = validate_dimensions(
      &[input("seen", json!("yesterday"))],
      &schemas,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Expected date but got 'yesterday'");
  }

  #[test]
  fn unknown_data_type_is_reported_per_dimension() {
    let schemas =
      vec![schema("blob", DataType::Other("binary".to_owned()), false)];
    let err =
      validate_dimensions(&[input("blob", json!("x"))], &schemas)
        .unwrap_err();
    assert_eq!(err.messages, vec!["Unknown data type: 'binary'"]);
  }

  #[test]
  fn errors_are_collected_not_short_circuited() {
    let schemas = vec![
      schema("age", DataType::Number, true),
      schema("name", DataType::String, true),
    ];
    let err = validate_dimensions(
      &[input("age", json!("abc")), input("extra", json!(1))],
      &schemas,
    )
    .unwrap_err();
    assert_eq!(err.messages.len(), 3);
    assert_eq!(
      err.to_string(),
      "Missing required fields: name; Expected number but got 'abc'; \
       Unexpected dimension key: 'extra'"
    );
  }

  #[test]
  fn duplicate_schema_keys_are_rejected() {
    let schemas = vec![
      schema("age", DataType::Number, false),
      schema("age", DataType::String, false),
    ];
    let err = validate_schema_list(&schemas).unwrap_err();
    assert_eq!(err.messages, vec!["Duplicate dimension schema key: 'age'"]);
  }

  #[test]
  fn data_type_round_trips_unknown_strings() {
    let d: DataType = "binary".to_owned().into();
    assert_eq!(d, DataType::Other("binary".to_owned()));
    assert_eq!(String::from(d), "binary");
  }
}
