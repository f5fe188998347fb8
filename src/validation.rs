//! Schema validation helpers.
//!
//! Validates a configuration object (`serde_json::Value`) against a
//! [`Schema`] and runs the [`AttributeValidator`]s attached to its attributes.
//! Values that are still unknown are skipped; they are checked again once the
//! host resolves them.
//!
//! # Example
//!
//! ```
//! use openhab_provider::item_type::ItemTypeValidator;
//! use openhab_provider::schema::{Attribute, Schema};
//! use openhab_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute("type", Attribute::required_string().with_validator(ItemTypeValidator));
//!
//! let diagnostics = validate(&schema, &json!({"name": "Light", "type": "Switch"}));
//! assert!(diagnostics.is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"name": "Light", "type": "Lamp"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("type".to_string()));
//! ```

use std::fmt;

use serde_json::Value;

use crate::schema::{Attribute, AttributeType, Diagnostic, Schema};
use crate::value::is_unknown;

/// A check on a single known string value.
///
/// Implementations push at most a handful of diagnostics into `diagnostics`,
/// each scoped to `path`.
pub trait AttributeValidator: fmt::Debug + Send + Sync {
    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// Validate `value` found at `path`.
    fn validate(&self, path: &str, value: &str, diagnostics: &mut Vec<Diagnostic>);
}

/// Validate a JSON value against a schema.
///
/// Returns a list of diagnostics for any validation errors found.
/// An empty list means the value is valid.
///
/// # Validation Rules
///
/// - Required attributes must be present and non-null
/// - Optional attributes may be absent or null
/// - Computed attributes are skipped (provider sets these)
/// - Unknown values are accepted as-is
/// - Attribute types must match the schema
/// - Validators run on known string values
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match value {
        Value::Object(map) => map,
        Value::Null => return diagnostics,
        _ => {
            diagnostics.push(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", value_type_name(value))),
            );
            return diagnostics;
        },
    };

    for (name, attr) in schema.sorted_attributes() {
        validate_attribute(attr, obj.get(name), name, &mut diagnostics);
    }

    diagnostics
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if attr.flags.is_computed_only() {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        },
        Some(v) if is_unknown(v) => {},
        Some(v) => {
            let before = diagnostics.len();
            validate_attribute_type(&attr.attr_type, v, path, diagnostics);

            // validators only see well-typed values
            if diagnostics.len() == before {
                if let Some(s) = v.as_str() {
                    for validator in &attr.validators {
                        validator.validate(path, s, diagnostics);
                    }
                }
            }
        },
    }
}

fn validate_attribute_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match attr_type {
        AttributeType::String => {
            if !value.is_string() {
                diagnostics.push(type_error(path, "string", value));
            }
        },
        AttributeType::List(element_type) => {
            if let Some(arr) = value.as_array() {
                for (i, elem) in arr.iter().enumerate() {
                    let elem_path = format!("{}.{}", path, i);
                    validate_attribute_type(element_type, elem, &elem_path, diagnostics);
                }
            } else {
                diagnostics.push(type_error(path, "list", value));
            }
        },
        AttributeType::Map(value_type) => {
            if let Some(obj) = value.as_object() {
                for (key, val) in obj {
                    let key_path = format!("{}.{}", path, key);
                    validate_attribute_type(value_type, val, &key_path, diagnostics);
                }
            } else {
                diagnostics.push(type_error(path, "map", value));
            }
        },
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
        .with_detail(format!("Expected {}, got {}", expected, value_type_name(got)))
        .with_attribute(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_type::ItemTypeValidator;
    use crate::value::UNKNOWN_VALUE;
    use serde_json::json;

    fn item_schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "type",
                Attribute::required_string().with_validator(ItemTypeValidator),
            )
            .with_attribute("category", Attribute::optional_string())
            .with_attribute("tags", Attribute::optional_string_list())
    }

    #[test]
    fn test_validate_required_string() {
        let schema = item_schema();

        let diagnostics = validate(&schema, &json!({"name": "Light", "type": "Switch"}));
        assert!(diagnostics.is_empty());

        let diagnostics = validate(&schema, &json!({"type": "Switch"}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("name".to_string()));

        let diagnostics = validate(&schema, &json!({"name": null, "type": "Switch"}));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_validate_type_mismatch() {
        let diagnostics = validate(
            &item_schema(),
            &json!({"name": "Light", "type": "Switch", "tags": "Lighting"}),
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Invalid type for attribute 'tags'");
        assert_eq!(diagnostics[0].detail, Some("Expected list, got string".to_string()));

        let diagnostics = validate(
            &item_schema(),
            &json!({"name": "Light", "type": "Switch", "tags": ["ok", 3]}),
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("tags.1".to_string()));
    }

    #[test]
    fn test_validator_runs_on_known_values() {
        let diagnostics = validate(&item_schema(), &json!({"name": "Light", "type": "Number:Bogus"}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Unknown dimension");
        assert_eq!(diagnostics[0].attribute, Some("type".to_string()));
    }

    #[test]
    fn test_validator_skipped_on_type_error() {
        let diagnostics = validate(&item_schema(), &json!({"name": "Light", "type": 5}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.starts_with("Invalid type"));
    }

    #[test]
    fn test_unknown_values_are_skipped() {
        let diagnostics = validate(
            &item_schema(),
            &json!({"name": UNKNOWN_VALUE, "type": UNKNOWN_VALUE, "tags": UNKNOWN_VALUE}),
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_computed_attributes_skipped() {
        let diagnostics = validate(
            &item_schema(),
            &json!({"id": 12, "name": "Light", "type": "Switch"}),
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_validate_non_object() {
        let diagnostics = validate(&item_schema(), &json!("nope"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Expected object");

        assert!(validate(&item_schema(), &Value::Null).is_empty());
    }
}
