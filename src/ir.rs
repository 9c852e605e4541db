// Result model handed to the emitter. No serde_json::Value here.

use indexmap::IndexMap;
use serde::Serialize;

/// Descriptor → allowed values, in first-registration order.
pub type EnumTable = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeModel {
    pub objects: Vec<ObjectDefinition>,   // children before the objects that use them
    pub includes: Vec<String>,            // sorted, no duplicates
    pub enums: EnumTable,
    pub has_enum: bool,
    pub has_variant: bool,
    pub helper_sources: Vec<String>,      // extra files the emitter has to produce
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectDefinition {
    pub name: String,                     // the object's own descriptor
    pub path: String,
    pub fields: Vec<FieldDefinition>,     // `declared_fields` order
    pub declared_absent: Vec<String>,     // declared but no matching property
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinition {
    pub name: String,
    pub ty: String,
    pub default: Option<String>,
}

impl TypeModel {
    pub fn object(&self, name: &str) -> Option<&ObjectDefinition> {
        self.objects.iter().find(|o| o.name == name)
    }
}

impl ObjectDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}
