//! Schema node to type expression compiler.
//!
//! [`Compiler::compile`] dispatches on the node kind and recurses into nested
//! content. Containers thread a fresh [`Scope`] per field; switches
//! ([`crate::switch`]) use it to find the field they compare against.

use crate::document::ErrorPolicy;
use crate::error::CompileError;
use crate::expr::{Member, TypeExpr};
use crate::primitives;
use crate::schema::{Field, Flags, SchemaNode};
use crate::scope::Scope;
use crate::switch;
use std::collections::HashSet;
use tracing::trace;

/// What to do with container fields marked `anon`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnonymousFields {
    /// Leave them out of the enclosing record.
    #[default]
    Omit,
    /// Splice their members into the enclosing record (or intersect with it
    /// when they are not records).
    Flatten,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub anonymous_fields: AnonymousFields,
    pub on_error: ErrorPolicy,
}

#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
    /// Names of the protocol's top-level entries; lets `[kind, options]` pairs
    /// refer to them.
    entries: HashSet<String>,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Compiler {
            options,
            entries: HashSet::new(),
        }
    }

    pub fn with_entries<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile one node in the given context.
    pub fn compile(&self, node: &SchemaNode, scope: &Scope<'_>) -> Result<TypeExpr, CompileError> {
        match node {
            SchemaNode::Primitive(name) => Ok(primitives::lookup(name)),
            SchemaNode::Container(fields) => self.compile_container(fields, scope),
            SchemaNode::Switch(sw) => switch::compile_switch(self, sw, scope),
            SchemaNode::Enumeration(literals) => Ok(compile_enumeration(literals)),
            SchemaNode::Array(element) => Ok(TypeExpr::array(self.compile(element, scope)?)),
            SchemaNode::Optional(inner) => self.compile_optional(inner, scope),
            SchemaNode::Bitflags(flags) => Ok(compile_bitflags_inline(flags)),
            SchemaNode::Bitfield(names) => Ok(compile_bitfield(names)),
            SchemaNode::LengthPrefixed { length_kind, inner } => Ok(TypeExpr::annotated(
                self.compile(inner, scope)?,
                format!("encapsulated (lengthType: {})", length_kind),
            )),
            SchemaNode::Parametrized { kind } => self.compile_parametrized(kind),
        }
    }

    fn compile_container(&self, fields: &[Field], scope: &Scope<'_>) -> Result<TypeExpr, CompileError> {
        let mut members = Vec::with_capacity(fields.len());
        let mut intersections = Vec::new();

        for (i, field) in fields.iter().enumerate() {
            let child = Scope::for_field(scope, fields, i);

            if field.anonymous {
                match self.options.anonymous_fields {
                    AnonymousFields::Omit => {
                        trace!(kind = field.node.kind(), "omitting anonymous field");
                    }
                    AnonymousFields::Flatten => match self.compile(&field.node, &child)? {
                        TypeExpr::Record(inner) => members.extend(inner),
                        TypeExpr::Intersection(parts) => {
                            for part in parts {
                                match part {
                                    TypeExpr::Record(inner) => members.extend(inner),
                                    other => intersections.push(other),
                                }
                            }
                        }
                        other => intersections.push(other),
                    },
                }
                continue;
            }

            let name = field
                .name
                .as_deref()
                .ok_or_else(|| CompileError::malformed("container", "field without a name must be anonymous"))?;

            // The switch's arms carry this field, so it is not a member itself.
            if let SchemaNode::Switch(_) = field.node {
                intersections.push(self.compile(&field.node, &child)?);
            } else {
                members.push(Member::new(name, self.compile(&field.node, &child)?));
            }
        }

        let record = TypeExpr::Record(members);
        if intersections.is_empty() {
            Ok(record)
        } else {
            let mut parts = Vec::with_capacity(intersections.len() + 1);
            parts.push(record);
            parts.extend(intersections);
            Ok(TypeExpr::Intersection(parts))
        }
    }

    fn compile_optional(&self, inner: &SchemaNode, scope: &Scope<'_>) -> Result<TypeExpr, CompileError> {
        if let SchemaNode::Optional(_) = inner {
            return Err(CompileError::unsupported("option(option)"));
        }
        Ok(TypeExpr::optional(self.compile(inner, scope)?))
    }

    fn compile_parametrized(&self, kind: &str) -> Result<TypeExpr, CompileError> {
        if primitives::is_primitive(kind) || self.entries.contains(kind) {
            Ok(primitives::lookup(kind))
        } else {
            Err(CompileError::unsupported(kind))
        }
    }
}

fn compile_enumeration(literals: &[String]) -> TypeExpr {
    TypeExpr::Union(literals.iter().cloned().map(TypeExpr::StringLiteral).collect())
}

/// `(name, value)` constants of a bitflag set, values as written in the output.
pub fn flag_constants(flags: &Flags) -> Vec<(&str, String)> {
    match flags {
        Flags::Sequence(names) => names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i.to_string()))
            .collect(),
        Flags::Mapping(pairs) => pairs.iter().map(|(n, v)| (n.as_str(), v.to_string())).collect(),
    }
}

/// Inline bitflag sets have no place for a declaration; they stay numeric.
fn compile_bitflags_inline(flags: &Flags) -> TypeExpr {
    let constants = flag_constants(flags)
        .into_iter()
        .map(|(n, v)| format!("{} = {}", n, v))
        .collect::<Vec<_>>()
        .join(", ");
    TypeExpr::annotated(TypeExpr::Primitive("number"), format!("bitflags: {}", constants))
}

fn compile_bitfield(names: &[String]) -> TypeExpr {
    TypeExpr::Record(
        names
            .iter()
            .map(|n| Member::new(n.clone(), TypeExpr::Primitive("number")))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile_json(compiler: &Compiler, v: serde_json::Value) -> Result<TypeExpr, CompileError> {
        let node = SchemaNode::from_json(&v)?;
        compiler.compile(&node, &Scope::root())
    }

    #[test]
    fn enumeration_keeps_duplicate_literals() {
        let c = Compiler::default();
        let e = compile_json(&c, json!(["mapper", { "type": "u8", "mappings": { "0": "a", "1": "b", "2": "a" } }]))
            .expect("compile");
        assert_eq!(e.to_string(), "'a' | 'b' | 'a'");
    }

    #[test]
    fn bitfield_members_are_numbers() {
        let c = Compiler::default();
        let e = compile_json(&c, json!(["bitfield", [
            { "name": "x", "size": 26, "signed": true },
            { "name": "y", "size": 12, "signed": true }
        ]]))
        .expect("compile");
        assert_eq!(e.to_string(), "{\n  x: number\n  y: number\n}");
    }

    #[test]
    fn encapsulated_is_annotated_inner() {
        let c = Compiler::default();
        let e = compile_json(&c, json!(["encapsulated", { "lengthType": "varint", "type": "nbt" }])).expect("compile");
        assert_eq!(e.to_string(), "any /* encapsulated (lengthType: varint) */");
    }

    #[test]
    fn inline_bitflags_are_annotated_numbers() {
        let c = Compiler::default();
        let e = compile_json(&c, json!(["bitflags", { "type": "u8", "flags": { "a": 1, "b": 8 } }])).expect("compile");
        assert_eq!(e.to_string(), "number /* bitflags: a = 1, b = 8 */");
    }

    #[test]
    fn parametrized_primitive_and_entry() {
        let c = Compiler::default().with_entries(["ItemStack"]);
        assert_eq!(
            compile_json(&c, json!(["pstring", { "countType": "varint" }])).expect("compile").to_string(),
            "string"
        );
        assert_eq!(
            compile_json(&c, json!(["ItemStack", { "x": 1 }])).expect("compile").to_string(),
            "ItemStack"
        );
        let err = compile_json(&c, json!(["entityMetadataLoop", {}])).unwrap_err();
        assert_eq!(err, CompileError::UnsupportedNode { kind: "entityMetadataLoop".into() });
    }

    #[test]
    fn double_optional_is_unsupported() {
        let c = Compiler::default();
        let err = compile_json(&c, json!(["option", ["option", "u8"]])).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedNode { .. }));
    }

    #[test]
    fn anonymous_field_omitted_by_default() {
        let c = Compiler::default();
        let e = compile_json(&c, json!(["container", [
            { "name": "a", "type": "u8" },
            { "anon": true, "type": ["container", [{ "name": "hidden", "type": "u8" }]] }
        ]]))
        .expect("compile");
        assert_eq!(e.to_string(), "{\n  a: number\n}");
    }

    #[test]
    fn anonymous_field_flattened_when_configured() {
        let c = Compiler::new(CompileOptions {
            anonymous_fields: AnonymousFields::Flatten,
            ..CompileOptions::default()
        });
        let e = compile_json(&c, json!(["container", [
            { "name": "a", "type": "u8" },
            { "anon": true, "type": ["container", [{ "name": "b", "type": "bool" }]] }
        ]]))
        .expect("compile");
        assert_eq!(e.to_string(), "{\n  a: number\n  b: boolean\n}");
    }
}
