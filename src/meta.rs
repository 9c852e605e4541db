//! Meta-schema gate run before any resolution work.

use once_cell::sync::Lazy;
use serde_json::Value;

/// Meta-schema describing the schema shapes the compiler understands.
pub const BUNDLED_META_SCHEMA_SRC: &str = include_str!("../meta_schema/typemodel.schema.json");

pub static BUNDLED_META_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(BUNDLED_META_SCHEMA_SRC).expect("bundled meta-schema is valid JSON")
});

/// Pass/fail check of a raw document. `Err` carries a human-readable detail.
pub trait MetaValidator: Send + Sync {
    fn validate(&self, document: &Value) -> Result<(), String>;
}

/// Skips meta validation; decoding still rejects unsupported shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl MetaValidator for AcceptAll {
    fn validate(&self, _document: &Value) -> Result<(), String> {
        Ok(())
    }
}

/// Validation backed by the `jsonschema` crate.
pub struct JsonSchemaMetaValidator {
    validator: jsonschema::Validator,
}

impl JsonSchemaMetaValidator {
    pub fn new(meta_schema: &Value) -> Result<Self, String> {
        let validator = jsonschema::validator_for(meta_schema)
            .map_err(|error| format!("failed to compile meta-schema: {error}"))?;
        Ok(Self { validator })
    }

    pub fn bundled() -> Self {
        Self::new(&BUNDLED_META_SCHEMA).expect("bundled meta-schema compiles")
    }
}

impl MetaValidator for JsonSchemaMetaValidator {
    fn validate(&self, document: &Value) -> Result<(), String> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(document)
            .map(|error| format!("{error}"))
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("; "))
        }
    }
}
