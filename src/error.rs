use crate::path::SchemaPath;

/// Every failure is fatal: a compile either yields a full model or one of these.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("schema does not match the meta-schema: {detail}")]
    SchemaFormat { detail: String },

    #[error("invalid json at {path}: property '{property}' is not contained in 'declared_fields: [{}]'", .declared.join(", "))]
    InvalidFieldList {
        path: SchemaPath,
        property: String,
        declared: Vec<String>,
    },

    #[error("invalid json at {path}: no type mapping for '{type_name}'")]
    UnknownPrimitiveType { path: SchemaPath, type_name: String },

    #[error("invalid json at {path}: cannot render default literal {literal}")]
    UnsupportedLiteral { path: SchemaPath, literal: String },

    #[error("invalid json at {path}: schema nesting exceeds {limit} levels")]
    NestingTooDeep { path: SchemaPath, limit: usize },
}

impl CompileError {
    /// Locator of the offending node, when the error is tied to one.
    pub fn path(&self) -> Option<&SchemaPath> {
        match self {
            CompileError::SchemaFormat { .. } => None,
            CompileError::InvalidFieldList { path, .. }
            | CompileError::UnknownPrimitiveType { path, .. }
            | CompileError::UnsupportedLiteral { path, .. }
            | CompileError::NestingTooDeep { path, .. } => Some(path),
        }
    }
}

pub type Result<T, E = CompileError> = std::result::Result<T, E>;
