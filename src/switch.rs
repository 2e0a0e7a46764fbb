//! Discriminated unions (`switch` nodes).
//!
//! Each arm pairs a condition on the compared field with the field that owns
//! the switch:
//!
//! ```text
//! ["container", [
//!   { "name": "kind", "type": "varint" },
//!   { "name": "data", "type": ["switch", { "compareTo": "kind", "fields": { "1": "A", "2": "B" } }] }
//! ]]
//! ```
//!
//! compiles to
//!
//! ```text
//! {
//!   kind: number
//! } & ({
//!   kind: '1'
//!   data: A
//! } | {
//!   kind: '2'
//!   data: B
//! })
//! ```
//!
//! The key `"true"` matches whenever the compared field is truthy; how that is
//! expressed depends on the compared field's declared type, see
//! [`Discriminant`].

use crate::compiler::Compiler;
use crate::error::CompileError;
use crate::expr::{Member, TypeExpr};
use crate::path::ComparePath;
use crate::primitives;
use crate::schema::{SchemaNode, Switch};
use crate::scope::{FieldRef, Resolved, Scope};

/// Key that matches unconditionally on a truthy compared field.
pub const TAUTOLOGY: &str = "true";

/// How a `"true"` arm constrains the compared field, by its declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discriminant<'a> {
    /// `bool`: the arm requires `field: true`.
    Boolean,
    /// Inline compound type or table primitive: compared as the literal `'true'`.
    Literal,
    /// Named type (e.g. a bitflag set declared elsewhere): the arm requires one
    /// of `Type.member` per `||` alternative.
    Named(&'a str),
}

impl<'a> Discriminant<'a> {
    pub fn classify(node: &'a SchemaNode) -> Self {
        match node {
            SchemaNode::Primitive(name) if name == "bool" => Discriminant::Boolean,
            SchemaNode::Primitive(name) if !primitives::is_primitive(name) => Discriminant::Named(name),
            _ => Discriminant::Literal,
        }
    }

    /// Condition member for a `"true"` arm. `field` is the compared field's
    /// name, `label` the key used for literal comparisons.
    pub fn condition(&self, field: &str, label: &str, path: &ComparePath) -> Member {
        match self {
            Discriminant::Boolean => Member::new(field, TypeExpr::BooleanLiteral(true)),
            Discriminant::Literal => Member::new(label, TypeExpr::StringLiteral(TAUTOLOGY.to_string())),
            Discriminant::Named(type_name) => {
                let alternatives = path
                    .alternatives
                    .iter()
                    .map(|alt| match alt.last().and_then(|s| s.member()) {
                        Some(member) => TypeExpr::Reference(format!("{}.{}", type_name, member)),
                        None => TypeExpr::Reference(type_name.to_string()),
                    })
                    .collect();
                Member::new(field, TypeExpr::Union(alternatives))
            }
        }
    }
}

/// Compile a switch into the union of its arms, in declaration order, with the
/// default (if any) as the final arm.
pub fn compile_switch(compiler: &Compiler, switch: &Switch, scope: &Scope<'_>) -> Result<TypeExpr, CompileError> {
    let path = ComparePath::parse(&switch.compare_to)?;
    let traversed = if path.is_traversal() {
        Some(resolve_target(&path, scope)?)
    } else {
        None
    };
    let label = traversed.and_then(|f| f.name).unwrap_or(&path.text);
    // Only a switch that is the field's own node is keyed by the field; one
    // nested in an array or option of it is not.
    let owner = scope
        .owner()
        .filter(|f| matches!(f.node, SchemaNode::Switch(own) if std::ptr::eq(own, switch)))
        .and_then(|f| f.name);

    let mut arms = Vec::with_capacity(switch.arms.len() + usize::from(switch.default.is_some()));
    for (key, node) in &switch.arms {
        let value = compiler.compile(node, scope)?;
        let condition = if key == TAUTOLOGY {
            let target = match traversed {
                Some(f) => f,
                None => lookup_sibling(&path, scope)?,
            };
            let field = target.name.unwrap_or(label);
            Discriminant::classify(target.node).condition(field, label, &path)
        } else {
            Member::new(label, TypeExpr::StringLiteral(key.clone()))
        };
        arms.push(arm(condition, owner, value));
    }

    if let Some(default) = &switch.default {
        let value = compiler.compile(default, scope)?;
        arms.push(match owner {
            Some(name) => TypeExpr::Record(vec![Member::new(name, value)]),
            None => value,
        });
    }

    Ok(TypeExpr::Union(arms))
}

fn arm(condition: Member, owner: Option<&str>, value: TypeExpr) -> TypeExpr {
    match owner {
        Some(name) => TypeExpr::Record(vec![condition, Member::new(name, value)]),
        None => TypeExpr::Intersection(vec![TypeExpr::Record(vec![condition]), value]),
    }
}

fn resolve_target<'s>(path: &ComparePath, scope: &'s Scope<'_>) -> Result<FieldRef<'s>, CompileError> {
    match scope.resolve_path(path)? {
        Resolved::Field(f) => Ok(f),
        Resolved::Scope(_) => Err(CompileError::broken(&path.text, "path names a scope, not a field")),
    }
}

fn lookup_sibling<'s>(path: &ComparePath, scope: &'s Scope<'_>) -> Result<FieldRef<'s>, CompileError> {
    let field = path.target_name().unwrap_or_default();
    scope
        .lookup(field)
        .ok_or_else(|| CompileError::UnresolvedDiscriminant {
            path: path.text.clone(),
            field: field.to_string(),
        })
}
