//! Typed view of the input schema document.
//!
//! Only the subset of JSON Schema the meta-schema permits is modeled here:
//! primitive leaves, arrays (`items` or `prefixItems`), inline primitive
//! variants (`type: [..]`), `oneOf` objects and objects with a declared
//! field list. Unknown keys are ignored.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Primitive `type` names with a direct type-map entry.
pub const PRIMITIVES: [&str; 4] = ["integer", "number", "string", "boolean"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    /// `"type": "string"`, `"type": "object"`, ...
    Single(String),
    /// `"type": ["string", "integer"]` → inline variant over primitives
    Union(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(rename = "type")]
    pub type_: TypeSpec,

    /// Explicit descriptor override; skips shape-based resolution for this node.
    #[serde(default, alias = "cpp_type", skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,

    #[serde(default, rename = "prefixItems", skip_serializing_if = "Option::is_none")]
    pub prefix_items: Option<Vec<SchemaNode>>,

    #[serde(default, rename = "oneOf", skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<SchemaNode>>,

    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_: Option<Vec<String>>,

    /// JSON `null` decodes to `None`: a null default is the same as no default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Opt-in marker for struct emission; the order is the emitted field order.
    #[serde(default, alias = "cpp_fields", skip_serializing_if = "Option::is_none")]
    pub declared_fields: Option<Vec<String>>,
}

impl TypeSpec {
    pub fn as_single(&self) -> Option<&str> {
        match self {
            TypeSpec::Single(name) => Some(name.as_str()),
            TypeSpec::Union(_) => None,
        }
    }
    pub fn is(&self, name: &str) -> bool {
        self.as_single() == Some(name)
    }
}

impl std::fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeSpec::Single(name) => write!(f, "{name}"),
            TypeSpec::Union(names) => write!(f, "[{}]", names.join(", ")),
        }
    }
}

impl SchemaNode {
    /// Bare node of the given `type`, everything else absent.
    pub fn of_type(name: impl Into<String>) -> Self {
        Self {
            type_: TypeSpec::Single(name.into()),
            target_type: None,
            title: None,
            description: None,
            properties: IndexMap::new(),
            items: None,
            prefix_items: None,
            one_of: None,
            enum_: None,
            default: None,
            declared_fields: None,
        }
    }

    /// Decode a schema document, reporting the JSON path of the first shape error.
    pub fn from_value(document: &Value) -> Result<Self, String> {
        crate::path_de::from_value_with_path(document)
    }

    pub fn is_object(&self) -> bool {
        self.type_.is("object")
    }
    pub fn is_array(&self) -> bool {
        self.type_.is("array")
    }
}
