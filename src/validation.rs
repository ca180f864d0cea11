//! Schema validation helpers.
//!
//! Validates configuration values (as `serde_json::Value`) against a
//! [`Schema`] before anything is sent to ONTAP.
//!
//! # Example
//!
//! ```
//! use ontap_provider::schema::{Attribute, Schema};
//! use ontap_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute("unix_permissions", Attribute::optional_int64());
//!
//! let diagnostics = validate(&schema, &json!({"name": "q1", "unix_permissions": 755}));
//! assert!(diagnostics.is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"name": "q1", "unix_permissions": "755"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute.as_deref(), Some("unix_permissions"));
//! ```

use crate::schema::{Attribute, AttributeType, Diagnostic, Schema};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Validate a configuration value against a schema.
///
/// Rules:
///
/// - the root must be an object (or null, which is treated as empty)
/// - required attributes must be present and non-null
/// - computed-only attributes must not be set
/// - attributes not declared in the schema are rejected
/// - values must match their declared types, recursively
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let empty = Map::new();
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => {
            diagnostics.push(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", value_type_name(other))),
            );
            return diagnostics;
        },
    };

    let mut names: Vec<&String> = schema.attributes.keys().collect();
    names.sort();
    for name in names {
        let attr = &schema.attributes[name];
        validate_attribute(attr, obj.get(name.as_str()), name, &mut diagnostics);
    }

    for (name, value) in obj {
        if !schema.attributes.contains_key(name) && !value.is_null() {
            diagnostics.push(unsupported(name));
        }
    }

    diagnostics
}

/// Validate a value against a schema, returning the diagnostics as an error.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Check if a value is valid against a schema.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
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
        Some(_) if attr.flags.is_computed_only() => {
            diagnostics.push(
                Diagnostic::error(format!("Value for unconfigurable attribute '{}'", path))
                    .with_detail("This attribute is computed by ONTAP and cannot be set")
                    .with_attribute(path),
            );
        },
        Some(v) => validate_type(&attr.attr_type, v, path, diagnostics),
    }
}

fn validate_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    // Nulls are allowed anywhere below the top level.
    if value.is_null() {
        return;
    }
    match attr_type {
        AttributeType::String => {
            if !value.is_string() {
                diagnostics.push(type_error(path, "string", value));
            }
        },
        AttributeType::Int64 => {
            if value.as_i64().is_none() {
                diagnostics.push(type_error(path, "int64", value));
            }
        },
        AttributeType::Bool => {
            if !value.is_boolean() {
                diagnostics.push(type_error(path, "bool", value));
            }
        },
        AttributeType::List(element_type) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    validate_type(element_type, item, &format!("{}.{}", path, i), diagnostics);
                }
            },
            None => diagnostics.push(type_error(path, "list", value)),
        },
        AttributeType::Object(fields) => match value.as_object() {
            Some(obj) => validate_object(fields, obj, path, diagnostics),
            None => diagnostics.push(type_error(path, "object", value)),
        },
    }
}

fn validate_object(
    fields: &HashMap<String, AttributeType>,
    obj: &Map<String, Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (name, value) in obj {
        let field_path = format!("{}.{}", path, name);
        match fields.get(name) {
            Some(field_type) => validate_type(field_type, value, &field_path, diagnostics),
            None if !value.is_null() => diagnostics.push(unsupported(&field_path)),
            None => {},
        }
    }
}

fn unsupported(path: &str) -> Diagnostic {
    Diagnostic::error(format!("Unsupported attribute '{}'", path))
        .with_detail("An attribute with this name is not expected here")
        .with_attribute(path)
}

fn type_error(path: &str, expected: &str, value: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for '{}'", path))
        .with_detail(format!("Expected {}, got {}", expected, value_type_name(value)))
        .with_attribute(path)
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn qtree_like() -> Schema {
        Schema::new()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("volume_uuid", Attribute::required_string())
            .with_attribute("security_style", Attribute::optional_string())
            .with_attribute("unix_permissions", Attribute::optional_int64())
            .with_attribute("path", Attribute::computed_string())
    }

    #[test]
    fn test_valid_config() {
        let diags = validate(
            &qtree_like(),
            &json!({"name": "q1", "volume_uuid": "V1", "security_style": "unix"}),
        );
        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn test_missing_required() {
        let diags = validate(&qtree_like(), &json!({"name": "q1"}));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].attribute.as_deref(), Some("volume_uuid"));
        assert!(diags[0].summary.contains("Missing required"));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let diags = validate(&qtree_like(), &json!({"name": null, "volume_uuid": "V1"}));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].attribute.as_deref(), Some("name"));
    }

    #[test]
    fn test_computed_only_cannot_be_set() {
        let diags = validate(
            &qtree_like(),
            &json!({"name": "q1", "volume_uuid": "V1", "path": "/vol/v/q1"}),
        );
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("unconfigurable"));

        // A null computed value is what hosts send for unknowns.
        let diags = validate(&qtree_like(), &json!({"name": "q1", "volume_uuid": "V1", "path": null}));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_unknown_attribute() {
        let diags = validate(&qtree_like(), &json!({"name": "q1", "volume_uuid": "V1", "size": 10}));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].attribute.as_deref(), Some("size"));
    }

    #[test]
    fn test_type_mismatch() {
        let diags = validate(
            &qtree_like(),
            &json!({"name": 1, "volume_uuid": "V1", "unix_permissions": 7.5}),
        );
        assert_eq!(diags.len(), 2);
        let paths: Vec<_> = diags.iter().filter_map(|d| d.attribute.as_deref()).collect();
        assert!(paths.contains(&"name"));
        assert!(paths.contains(&"unix_permissions"));
    }

    #[test]
    fn test_nested_objects_and_lists() {
        let schema = Schema::new().with_attribute(
            "ip_interfaces",
            Attribute::optional(AttributeType::list(AttributeType::object([
                ("name", AttributeType::String),
                (
                    "ip",
                    AttributeType::object([
                        ("address", AttributeType::String),
                        ("netmask", AttributeType::String),
                    ]),
                ),
                ("services", AttributeType::string_list()),
            ]))),
        );

        let ok = json!({"ip_interfaces": [
            {"name": "lif1", "ip": {"address": "10.0.0.5", "netmask": "24"}, "services": ["data_nfs"]}
        ]});
        assert!(is_valid(&schema, &ok));

        let bad = json!({"ip_interfaces": [
            {"name": "lif1", "ip": {"address": 10, "gateway": "10.0.0.1"}, "services": [1]}
        ]});
        let diags = validate(&schema, &bad);
        let paths: Vec<_> = diags.iter().filter_map(|d| d.attribute.clone()).collect();
        assert!(paths.contains(&"ip_interfaces.0.ip.address".to_string()));
        assert!(paths.contains(&"ip_interfaces.0.ip.gateway".to_string()));
        assert!(paths.contains(&"ip_interfaces.0.services.0".to_string()));
    }

    #[test]
    fn test_root_not_object() {
        let diags = validate(&qtree_like(), &json!("q1"));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Expected object");
    }

    #[test]
    fn test_validate_result_helper() {
        assert!(validate_result(&qtree_like(), &json!({"name": "q1", "volume_uuid": "V1"})).is_ok());
        let err = validate_result(&qtree_like(), &json!({})).unwrap_err();
        assert_eq!(err.len(), 2);
    }
}
