//! Type resolution: schema tree → descriptor-annotated tree.
//!
//! Pure transform over a borrowed [`SchemaNode`] tree. Children resolve
//! before their parent so composite descriptors can be assembled from
//! child descriptors. Enum entries, include directives and the
//! enum/variant dependency flags are gathered on the way.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde_json::Value;

use crate::config::CompileOptions;
use crate::error::{CompileError, Result};
use crate::ir::EnumTable;
use crate::path::SchemaPath;
use crate::schema::{SchemaNode, TypeSpec};

/// Nesting limit; deeper documents are rejected instead of overflowing the stack.
pub const MAX_DEPTH: usize = 128;

/// Raw JSON nesting limit, for literals such as `default` that are not schema nodes.
pub const MAX_VALUE_DEPTH: usize = 4 * MAX_DEPTH;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// A schema node paired with its resolved descriptor. Mirrors the shape of
/// the schema: every reachable child is resolved too.
#[derive(Debug, Clone)]
pub struct ResolvedNode<'s> {
    pub schema: &'s SchemaNode,
    pub descriptor: String,
    pub items: Option<Box<ResolvedNode<'s>>>,
    pub prefix_items: Vec<ResolvedNode<'s>>,
    pub one_of: Vec<ResolvedNode<'s>>,
    pub properties: IndexMap<String, ResolvedNode<'s>>,
}

#[derive(Debug, Clone)]
pub struct Resolution<'s> {
    pub root: ResolvedNode<'s>,
    pub enums: EnumTable,
    pub includes: BTreeSet<String>,
    pub has_enum: bool,
    pub has_variant: bool,
}

pub struct TypeResolver<'o> {
    options: &'o CompileOptions,
    enums: EnumTable,
    includes: BTreeSet<String>,
    has_enum: bool,
    has_variant: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy)]
enum Slot {
    Node,
    NodeList,
    NodeMap,
    Literal,
}

/// Rejects an over-nested raw document without recursing, so decoding and
/// meta validation never see one.
pub fn check_nesting(document: &Value) -> Result<()> {
    let mut stack = vec![(document, SchemaPath::root(), Slot::Node, 0usize, 0usize)];
    while let Some((value, path, slot, depth, raw_depth)) = stack.pop() {
        if depth > MAX_DEPTH {
            return Err(CompileError::NestingTooDeep { path, limit: MAX_DEPTH });
        }
        if raw_depth > MAX_VALUE_DEPTH {
            return Err(CompileError::NestingTooDeep { path, limit: MAX_VALUE_DEPTH });
        }
        match value {
            Value::Object(map) => {
                for (key, sub) in map {
                    let (sub_slot, sub_depth) = match (slot, key.as_str()) {
                        (Slot::Node, "items") => (Slot::Node, depth + 1),
                        (Slot::Node, "prefixItems" | "oneOf") => (Slot::NodeList, depth),
                        (Slot::Node, "properties") => (Slot::NodeMap, depth),
                        (Slot::NodeMap, _) => (Slot::Node, depth + 1),
                        _ => (Slot::Literal, depth),
                    };
                    stack.push((sub, path.key(key.as_str()), sub_slot, sub_depth, raw_depth + 1));
                }
            }
            Value::Array(xs) => {
                for (idx, sub) in xs.iter().enumerate() {
                    let (sub_slot, sub_depth) = match slot {
                        Slot::NodeList => (Slot::Node, depth + 1),
                        _ => (Slot::Literal, depth),
                    };
                    stack.push((sub, path.index(idx), sub_slot, sub_depth, raw_depth + 1));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

impl<'o> TypeResolver<'o> {
    pub fn new(options: &'o CompileOptions) -> Self {
        Self {
            options,
            enums: EnumTable::new(),
            includes: BTreeSet::new(),
            has_enum: false,
            has_variant: false,
        }
    }

    pub fn resolve<'s>(mut self, root: &'s SchemaNode) -> Result<Resolution<'s>> {
        let root = self.node(root, &SchemaPath::root(), 0)?;
        Ok(Resolution {
            root,
            enums: self.enums,
            includes: self.includes,
            has_enum: self.has_enum,
            has_variant: self.has_variant,
        })
    }

    fn node<'s>(
        &mut self,
        node: &'s SchemaNode,
        path: &SchemaPath,
        depth: usize,
    ) -> Result<ResolvedNode<'s>> {
        if depth > MAX_DEPTH {
            return Err(CompileError::NestingTooDeep {
                path: path.clone(),
                limit: MAX_DEPTH,
            });
        }

        // ---- children feeding the descriptor ----
        // only read on the shapes that use them: arrays and object variants
        let (items, prefix_items) = if node.is_array() {
            let items = match &node.items {
                Some(item) => Some(Box::new(self.node(item, &path.key("items"), depth + 1)?)),
                None => None,
            };
            let prefix_items = self.each(node.prefix_items.as_deref(), &path.key("prefixItems"), depth)?;
            (items, prefix_items)
        } else {
            (None, Vec::new())
        };
        let one_of = if node.is_object() {
            self.each(node.one_of.as_deref(), &path.key("oneOf"), depth)?
        } else {
            Vec::new()
        };

        // ---- own descriptor ----
        let descriptor = match &node.target_type {
            Some(explicit) => explicit.clone(),
            None => self.shape_descriptor(node, items.as_deref(), &prefix_items, &one_of, path)?,
        };

        // ---- enum table ----
        if let Some(values) = &node.enum_ {
            if node.type_.is("string") {
                self.enums.insert(descriptor.clone(), values.clone());
                self.has_enum = true;
                self.includes.insert(self.options.helpers.enum_include());
            }
        }

        // ---- properties, whatever the node's shape ----
        let mut properties = IndexMap::with_capacity(node.properties.len());
        let props_path = path.key("properties");
        for (name, prop) in &node.properties {
            let resolved = self.node(prop, &props_path.key(name.as_str()), depth + 1)?;
            properties.insert(name.clone(), resolved);
        }

        // ---- includes (substring match) ----
        for include in self.options.include_map.matching(&descriptor) {
            self.includes.insert(include.to_string());
        }

        log::debug!("resolved {path} → {descriptor}");
        Ok(ResolvedNode {
            schema: node,
            descriptor,
            items,
            prefix_items,
            one_of,
            properties,
        })
    }

    fn each<'s>(
        &mut self,
        nodes: Option<&'s [SchemaNode]>,
        path: &SchemaPath,
        depth: usize,
    ) -> Result<Vec<ResolvedNode<'s>>> {
        nodes
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(idx, node)| self.node(node, &path.index(idx), depth + 1))
            .collect()
    }

    fn shape_descriptor(
        &mut self,
        node: &SchemaNode,
        items: Option<&ResolvedNode<'_>>,
        prefix_items: &[ResolvedNode<'_>],
        one_of: &[ResolvedNode<'_>],
        path: &SchemaPath,
    ) -> Result<String> {
        match &node.type_ {
            // inline variant over primitives
            TypeSpec::Union(names) => {
                let arms = names
                    .iter()
                    .map(|name| self.lookup(name, path).map(str::to_string))
                    .collect::<Result<Vec<_>>>()?;
                self.variant(&arms, path)
            }
            TypeSpec::Single(name) if name == "array" && items.is_some() => {
                let item = items.map(|n| n.descriptor.as_str()).unwrap_or_default();
                Ok(format!("{}<{item}>", self.lookup("array", path)?))
            }
            TypeSpec::Single(name) if name == "array" && node.prefix_items.is_some() => {
                let elems = prefix_items.iter().map(|n| n.descriptor.as_str()).collect::<Vec<_>>();
                Ok(format!("{}<{}>", self.lookup("tuple", path)?, elems.join(", ")))
            }
            TypeSpec::Single(name) if name == "object" && node.one_of.is_some() => {
                let arms = one_of.iter().map(|n| n.descriptor.clone()).collect::<Vec<_>>();
                self.variant(&arms, path)
            }
            TypeSpec::Single(name) => Ok(self.lookup(name, path)?.to_string()),
        }
    }

    fn variant(&mut self, arms: &[String], path: &SchemaPath) -> Result<String> {
        let out = format!("{}<{}>", self.lookup("variant", path)?, arms.join(", "));
        self.has_variant = true;
        self.includes.insert(self.options.helpers.variant_include());
        Ok(out)
    }

    fn lookup(&self, type_name: &str, path: &SchemaPath) -> Result<&'o str> {
        self.options
            .type_map
            .get(type_name)
            .ok_or_else(|| CompileError::UnknownPrimitiveType {
                path: path.clone(),
                type_name: type_name.to_string(),
            })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
