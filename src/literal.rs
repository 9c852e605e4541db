//! JSON default values → target literal expressions.
//!
//! Arrays always go through `json::array({..})` rather than a brace list so
//! the text stays valid when the element type is a variant. Strings are
//! quoted as-is: embedded quotes are not escaped.

use serde_json::Value;

use crate::error::{CompileError, Result};
use crate::path::SchemaPath;

/// Renders `value` as a literal expression.
///
/// The `UnsupportedLiteral` branch needs a number with neither an integer
/// nor a finite `f64` view. Plain `serde_json` never builds one; it only
/// becomes reachable with the `arbitrary_precision` feature.
pub fn to_literal(value: &Value, path: &SchemaPath) -> Result<String> {
    match value {
        Value::Object(map) => {
            let pairs = map
                .iter()
                .map(|(name, sub)| Ok(format!("{{\"{name}\",{}}}", to_literal(sub, path)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("{{{}}}", pairs.join(",")))
        }
        Value::Array(xs) => {
            let elems = xs
                .iter()
                .map(|sub| to_literal(sub, path))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("json::array({{{}}})", elems.join(",")))
        }
        Value::String(s) => Ok(format!("\"{s}\"")),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Ok(n.to_string())
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() => Ok(n.to_string()),
                    _ => Err(CompileError::UnsupportedLiteral {
                        path: path.clone(),
                        literal: n.to_string(),
                    }),
                }
            }
        }
        Value::Bool(true) => Ok("true".to_string()),
        Value::Bool(false) => Ok("false".to_string()),
        Value::Null => Ok("nullptr".to_string()),
    }
}
