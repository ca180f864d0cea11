//! Attribute schemas for the provider block, resources and data sources.
//!
//! Every ONTAP entity is described by a flat attribute map. Nested ONTAP
//! structures (CIFS settings, IP interfaces, routes) are declared as object
//! or list-of-object attribute types rather than separate blocks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Value type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// UTF-8 string.
    String,
    /// Signed 64-bit integer.
    Int64,
    /// `true` or `false`.
    Bool,
    /// Homogeneous list.
    List(Box<AttributeType>),
    /// Fixed set of named fields, e.g. an ONTAP `dns` or `cifs` object.
    Object(HashMap<String, AttributeType>),
}

impl AttributeType {
    /// List of `element`.
    pub fn list(element: AttributeType) -> Self {
        Self::List(Box::new(element))
    }

    /// Object built from `(field, type)` pairs.
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, AttributeType)>,
        K: Into<String>,
    {
        Self::Object(fields.into_iter().map(|(k, t)| (k.into(), t)).collect())
    }

    /// A `{name, uuid}` reference object, as ONTAP uses for related entities.
    pub fn reference() -> Self {
        Self::object([("name", Self::String), ("uuid", Self::String)])
    }

    /// `list(string)`, used for DNS domains, servers and LIF services.
    pub fn string_list() -> Self {
        Self::list(Self::String)
    }
}

/// Who may set an attribute: the practitioner, ONTAP, or either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttributeFlags {
    /// Must be present in configuration.
    pub required: bool,
    /// May be present in configuration.
    pub optional: bool,
    /// Filled in from what ONTAP reports.
    pub computed: bool,
    /// Never logged or shown, e.g. the cluster password.
    pub sensitive: bool,
}

impl AttributeFlags {
    const NONE: Self = Self {
        required: false,
        optional: false,
        computed: false,
        sensitive: false,
    };

    /// Set by the practitioner, always.
    pub const fn required() -> Self {
        Self {
            required: true,
            ..Self::NONE
        }
    }

    /// Set by the practitioner, or not at all.
    pub const fn optional() -> Self {
        Self {
            optional: true,
            ..Self::NONE
        }
    }

    /// Set only by ONTAP.
    pub const fn computed() -> Self {
        Self {
            computed: true,
            ..Self::NONE
        }
    }

    /// Set by the practitioner, or by ONTAP when left unset.
    pub const fn optional_computed() -> Self {
        Self {
            optional: true,
            computed: true,
            ..Self::NONE
        }
    }

    /// Configuration must leave this attribute unset.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/// One attribute of a [`Schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Value type.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Who may set the attribute.
    #[serde(flatten)]
    pub flags: AttributeFlags,
    /// Shown to practitioners.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// A planned change to this attribute replaces the ONTAP object
    /// instead of patching it.
    #[serde(default)]
    pub force_new: bool,
}

impl Attribute {
    fn with_flags(attr_type: AttributeType, flags: AttributeFlags) -> Self {
        Self {
            attr_type,
            flags,
            description: None,
            force_new: false,
        }
    }

    /// Optional attribute of `attr_type`.
    pub fn optional(attr_type: AttributeType) -> Self {
        Self::with_flags(attr_type, AttributeFlags::optional())
    }

    /// Computed attribute of `attr_type`.
    pub fn computed(attr_type: AttributeType) -> Self {
        Self::with_flags(attr_type, AttributeFlags::computed())
    }

    /// Optional attribute of `attr_type` that ONTAP defaults when unset.
    pub fn optional_computed(attr_type: AttributeType) -> Self {
        Self::with_flags(attr_type, AttributeFlags::optional_computed())
    }

    /// Required string.
    pub fn required_string() -> Self {
        Self::with_flags(AttributeType::String, AttributeFlags::required())
    }

    /// Optional string.
    pub fn optional_string() -> Self {
        Self::optional(AttributeType::String)
    }

    /// String reported by ONTAP.
    pub fn computed_string() -> Self {
        Self::computed(AttributeType::String)
    }

    /// Optional integer.
    pub fn optional_int64() -> Self {
        Self::optional(AttributeType::Int64)
    }

    /// Integer reported by ONTAP.
    pub fn computed_int64() -> Self {
        Self::computed(AttributeType::Int64)
    }

    /// Optional boolean.
    pub fn optional_bool() -> Self {
        Self::optional(AttributeType::Bool)
    }

    /// Boolean reported by ONTAP.
    pub fn computed_bool() -> Self {
        Self::computed(AttributeType::Bool)
    }

    /// Attach documentation shown to practitioners.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// See [`Attribute::force_new`].
    pub fn with_force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Mark as sensitive.
    pub fn sensitive(mut self) -> Self {
        self.flags.sensitive = true;
        self
    }
}

/// Attributes of the provider block, one resource or one data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Attributes keyed by name.
    #[serde(default)]
    pub attributes: HashMap<String, Attribute>,
    /// Shown to practitioners.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Schema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `attr` under `name`, replacing any earlier declaration.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    /// Attach documentation shown to practitioners.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Everything the provider exposes, keyed by type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderSchema {
    /// The provider block.
    #[serde(default)]
    pub provider: Schema,
    /// Resource schemas keyed by type name.
    #[serde(default)]
    pub resources: HashMap<String, Schema>,
    /// Data source schemas keyed by type name.
    #[serde(default)]
    pub data_sources: HashMap<String, Schema>,
}

impl ProviderSchema {
    /// A schema with an empty provider block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the provider block schema.
    pub fn with_provider_config(mut self, schema: Schema) -> Self {
        self.provider = schema;
        self
    }

    /// Register a resource schema.
    pub fn with_resource(mut self, type_name: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(type_name.into(), schema);
        self
    }

    /// Register a data source schema.
    pub fn with_data_source(mut self, type_name: impl Into<String>, schema: Schema) -> Self {
        self.data_sources.insert(type_name.into(), schema);
        self
    }
}

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// The operation cannot go ahead.
    Error,
    /// Reported, but the operation continues.
    Warning,
}

/// A message for the practitioner, optionally tied to an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Error or warning.
    pub severity: DiagnosticSeverity,
    /// One line, e.g. `Missing hostname`.
    pub summary: String,
    /// Longer explanation, e.g. how to fix the input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Attribute path the message refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    fn with_severity(severity: DiagnosticSeverity, summary: impl Into<String>) -> Self {
        Self {
            severity,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// A diagnostic that fails the operation.
    pub fn error(summary: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Error, summary)
    }

    /// A diagnostic that is only reported.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Warning, summary)
    }

    /// Add a longer explanation.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Point the diagnostic at an attribute.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Whether this diagnostic fails the operation.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

/// Whether any diagnostic in the slice is an error.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_type() {
        let reference = AttributeType::reference();
        match reference {
            AttributeType::Object(fields) => {
                assert_eq!(fields.get("uuid"), Some(&AttributeType::String));
                assert_eq!(fields.get("name"), Some(&AttributeType::String));
            },
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_attribute_flags() {
        assert!(AttributeFlags::computed().is_computed_only());
        assert!(!AttributeFlags::optional_computed().is_computed_only());
        assert!(!AttributeFlags::required().is_computed_only());
    }

    #[test]
    fn test_attribute_builders() {
        let attr = Attribute::required_string()
            .with_description("Volume UUID")
            .with_force_new();

        assert_eq!(attr.attr_type, AttributeType::String);
        assert!(attr.flags.required);
        assert_eq!(attr.description.as_deref(), Some("Volume UUID"));
        assert!(attr.force_new);

        let password = Attribute::optional_string().sensitive();
        assert!(password.flags.sensitive);
        assert!(password.flags.optional);
    }

    #[test]
    fn test_schema_serializes_type_tag() {
        let schema = Schema::new().with_attribute("name", Attribute::required_string());
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["attributes"]["name"]["type"], "string");
        assert_eq!(json["attributes"]["name"]["required"], true);
        assert_eq!(json["attributes"]["name"]["force_new"], false);
    }

    #[test]
    fn test_diagnostics() {
        let diags = vec![
            Diagnostic::warning("TLS verification disabled"),
            Diagnostic::error("Missing hostname").with_attribute("hostname"),
        ];
        assert!(has_errors(&diags));
        assert!(!has_errors(&diags[..1]));
        assert_eq!(diags[1].attribute.as_deref(), Some("hostname"));
    }
}
