//! Object collection: resolved tree → ordered struct definitions.
//!
//! Only nodes carrying a non-empty `declared_fields` become definitions. Walk order is
//! depth-first with `oneOf` alternatives before a node's own properties,
//! and nested definitions land before the definition that uses them.

use crate::error::{CompileError, Result};
use crate::ir::{FieldDefinition, ObjectDefinition};
use crate::literal::to_literal;
use crate::path::SchemaPath;
use crate::resolve::ResolvedNode;

#[derive(Debug, Default)]
pub struct ObjectCollector {
    objects: Vec<ObjectDefinition>,
}

impl ObjectCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect(mut self, root: &ResolvedNode<'_>) -> Result<Vec<ObjectDefinition>> {
        self.visit(root, &SchemaPath::root())?;
        Ok(self.objects)
    }

    /// Walks `node` and returns its rendered default literal, if it has one.
    fn visit(&mut self, node: &ResolvedNode<'_>, path: &SchemaPath) -> Result<Option<String>> {
        let schema = node.schema;
        let default = match &schema.default {
            Some(value) => Some(to_literal(value, path)?),
            None => None,
        };

        if schema.is_object() {
            for (idx, alt) in node.one_of.iter().enumerate() {
                self.visit(alt, &path.key("oneOf").index(idx))?;
            }
            // an empty list does not mark the node
            if let Some(declared) = schema.declared_fields.as_deref().filter(|d| !d.is_empty()) {
                self.object(node, declared, path)?;
            }
        } else if schema.is_array() {
            if let Some(items) = &node.items {
                self.visit(items, &path.key("items"))?;
            } else {
                for (idx, elem) in node.prefix_items.iter().enumerate() {
                    self.visit(elem, &path.key("prefixItems").index(idx))?;
                }
            }
        }
        Ok(default)
    }

    fn object(&mut self, node: &ResolvedNode<'_>, declared: &[String], path: &SchemaPath) -> Result<()> {
        // every property must be declared; declared names may be absent
        if let Some(property) = node.properties.keys().find(|name| !declared.contains(*name)) {
            return Err(CompileError::InvalidFieldList {
                path: path.clone(),
                property: property.clone(),
                declared: declared.to_vec(),
            });
        }

        let props_path = path.key("properties");
        let mut fields = Vec::with_capacity(declared.len());
        let mut declared_absent = Vec::new();
        for name in declared {
            match node.properties.get(name) {
                Some(prop) => {
                    let default = self.visit(prop, &props_path.key(name.as_str()))?;
                    fields.push(FieldDefinition {
                        name: name.clone(),
                        ty: prop.descriptor.clone(),
                        default,
                    });
                }
                None => declared_absent.push(name.clone()),
            }
        }

        log::debug!("object {} at {path}: {} field(s)", node.descriptor, fields.len());
        self.objects.push(ObjectDefinition {
            name: node.descriptor.clone(),
            path: path.to_string(),
            fields,
            declared_absent,
        });
        Ok(())
    }
}
