//! Schema → type model compiler.
//!
//! Reads a JSON Schema-like document and produces a fully resolved type
//! model (object definitions with ordered fields, enum tables, sorted
//! include directives, helper dependency flags) for a downstream emitter.
//!
//! Pipeline:
//! - meta validation ([`meta::MetaValidator`]) gates the raw document
//! - the document decodes into a typed [`schema::SchemaNode`] tree
//! - [`resolve::TypeResolver`] annotates every node with a descriptor
//! - [`collect::ObjectCollector`] extracts the emittable objects
pub mod cli;
pub mod collect;
pub mod config;
pub mod error;
pub mod ir;
pub mod literal;
pub mod meta;
pub mod path;
pub mod path_de;
pub mod resolve;
pub mod schema;

use serde_json::Value;

pub use config::{CompileOptions, IncludeMap, Settings, TypeMap};
pub use error::{CompileError, Result};
pub use ir::{FieldDefinition, ObjectDefinition, TypeModel};
pub use meta::{AcceptAll, JsonSchemaMetaValidator, MetaValidator};
pub use schema::SchemaNode;

// ------------------------------- Front API -------------------------------- //

pub struct Compiler {
    options: CompileOptions,
    validator: Box<dyn MetaValidator>,
}

impl Compiler {
    /// Compiler checking documents against the bundled meta-schema.
    pub fn new(options: CompileOptions) -> Self {
        Self::with_validator(options, Box::new(JsonSchemaMetaValidator::bundled()))
    }

    pub fn with_validator(options: CompileOptions, validator: Box<dyn MetaValidator>) -> Self {
        Self { options, validator }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn compile(&self, document: &Value) -> Result<TypeModel> {
        compile(document, &self.options, self.validator.as_ref())
    }
}

/// Validate, decode, resolve and collect. The caller's document is only read.
///
/// Nesting is checked on the raw document first, ahead of the validator.
pub fn compile(
    document: &Value,
    options: &CompileOptions,
    validator: &dyn MetaValidator,
) -> Result<TypeModel> {
    resolve::check_nesting(document)?;
    validator
        .validate(document)
        .map_err(|detail| CompileError::SchemaFormat { detail })?;
    let root = SchemaNode::from_value(document)
        .map_err(|detail| CompileError::SchemaFormat { detail })?;
    compile_node(&root, options)
}

/// Resolve and collect an already-decoded schema tree.
pub fn compile_node(root: &SchemaNode, options: &CompileOptions) -> Result<TypeModel> {
    let resolution = resolve::TypeResolver::new(options).resolve(root)?;
    let objects = collect::ObjectCollector::new().collect(&resolution.root)?;

    let mut helper_sources = Vec::new();
    if resolution.has_enum {
        helper_sources.push(options.helpers.enum_helper.clone());
    }
    if resolution.has_variant {
        helper_sources.push(options.helpers.variant_helper.clone());
    }

    let model = TypeModel {
        objects,
        includes: resolution.includes.into_iter().collect(),
        enums: resolution.enums,
        has_enum: resolution.has_enum,
        has_variant: resolution.has_variant,
        helper_sources,
    };
    log::info!(
        "compiled {} object(s), {} include(s), {} enum(s)",
        model.objects.len(),
        model.includes.len(),
        model.enums.len()
    );
    Ok(model)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report_schema() -> Value {
        json!({
            "type": "object",
            "target_type": "AddReportParams",
            "declared_fields": ["reportName", "reportingType", "interval", "metricParameters", "threshold"],
            "properties": {
                "reportName": { "type": "string" },
                "reportingType": {
                    "type": "string",
                    "target_type": "ReportingType",
                    "enum": ["OnChange", "OnRequest", "Periodic"],
                    "default": "OnRequest"
                },
                "interval": { "type": "integer", "default": 0 },
                "metricParameters": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "target_type": "MetricParams",
                        "declared_fields": ["id", "sensorPaths", "operationType"],
                        "properties": {
                            "sensorPaths": { "type": "array", "items": { "type": "string" }, "default": [] },
                            "id": { "type": "string", "default": "" },
                            "operationType": {
                                "type": "string",
                                "target_type": "OperationType",
                                "enum": ["single", "max", "min"]
                            }
                        }
                    }
                },
                "threshold": { "type": ["number", "string"] }
            }
        })
    }

    #[test]
    fn end_to_end_model() {
        let model = Compiler::new(CompileOptions::default()).compile(&report_schema()).unwrap();

        let names: Vec<&str> = model.objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["MetricParams", "AddReportParams"]);

        let metric = model.object("MetricParams").unwrap();
        assert_eq!(metric.field_names(), ["id", "sensorPaths", "operationType"]);
        assert_eq!(metric.field("sensorPaths").unwrap().ty, "std::vector<std::string>");
        assert_eq!(metric.field("sensorPaths").unwrap().default.as_deref(), Some("json::array({})"));
        assert_eq!(metric.field("id").unwrap().default.as_deref(), Some("\"\""));

        let report = model.object("AddReportParams").unwrap();
        assert_eq!(report.field("metricParameters").unwrap().ty, "std::vector<MetricParams>");
        assert_eq!(report.field("threshold").unwrap().ty, "std::variant<double, std::string>");
        assert_eq!(report.field("reportingType").unwrap().default.as_deref(), Some("\"OnRequest\""));

        assert_eq!(model.enums.keys().collect::<Vec<_>>(), ["ReportingType", "OperationType"]);
        assert!(model.has_enum);
        assert!(model.has_variant);
        assert_eq!(model.helper_sources, ["enum_conversion.hpp", "json_utils.hpp"]);
        assert_eq!(
            model.includes,
            ["\"enum_conversion.hpp\"", "\"json_utils.hpp\"", "<string>", "<variant>", "<vector>"]
        );
    }

    #[test]
    fn two_compiles_are_identical() {
        let compiler = Compiler::new(CompileOptions::default());
        let a = compiler.compile(&report_schema()).unwrap();
        let b = compiler.compile(&report_schema()).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn caller_document_is_not_mutated() {
        let doc = report_schema();
        let before = doc.clone();
        let _ = Compiler::new(CompileOptions::default()).compile(&doc).unwrap();
        assert_eq!(doc, before);
    }

    #[test]
    fn meta_validation_failure_aborts_first() {
        // would also fail resolution (no mapping for "object"), but the gate runs first
        let doc = json!({ "type": "object", "properties": { "xs": { "type": "array" } } });
        let err = Compiler::new(CompileOptions::default()).compile(&doc).unwrap_err();
        assert!(matches!(err, CompileError::SchemaFormat { .. }), "{err}");
    }

    #[test]
    fn over_nested_documents_stop_before_validation() {
        let mut doc = json!({ "type": "integer" });
        for _ in 0..=resolve::MAX_DEPTH {
            doc = json!({ "type": "array", "items": doc });
        }
        let err = Compiler::new(CompileOptions::default()).compile(&doc).unwrap_err();
        assert!(matches!(err, CompileError::NestingTooDeep { .. }), "{err}");
    }

    #[test]
    fn decode_errors_are_schema_format_errors() {
        let err = compile(&json!({ "type": 7 }), &CompileOptions::default(), &AcceptAll).unwrap_err();
        assert!(matches!(err, CompileError::SchemaFormat { .. }));
    }

    #[test]
    fn plain_object_needs_a_mapping() {
        let doc = json!({
            "type": "object",
            "declared_fields": ["n"],
            "properties": { "n": { "type": "integer" } }
        });
        let err = compile(&doc, &CompileOptions::default(), &AcceptAll).unwrap_err();
        assert!(matches!(err, CompileError::UnknownPrimitiveType { .. }));

        let options = CompileOptions {
            type_map: TypeMap::with_overrides([("object", "nlohmann::json")]),
            ..CompileOptions::default()
        };
        let model = compile(&doc, &options, &AcceptAll).unwrap();
        assert_eq!(model.objects[0].name, "nlohmann::json");
        assert_eq!(model.objects[0].field_names(), ["n"]);
    }

    #[test]
    fn no_helpers_without_enums_or_variants() {
        let doc = json!({
            "type": "object",
            "target_type": "Flat",
            "declared_fields": ["n"],
            "properties": { "n": { "type": "number" } }
        });
        let model = compile(&doc, &CompileOptions::default(), &AcceptAll).unwrap();
        assert!(!model.has_enum);
        assert!(!model.has_variant);
        assert!(model.helper_sources.is_empty());
        assert!(model.includes.is_empty());
    }
}
