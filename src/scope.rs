//! Context scopes and compare-path resolution.
//!
//! A [`Scope`] is a lookup frame built once per container field: it holds the
//! fields of that container visible from the field (earlier siblings and the
//! field itself) and a borrowed link to the scope the container was compiled
//! in. Scopes live on the compiler's stack, so the chain is never a cycle and
//! never owns schema data.

use crate::error::CompileError;
use crate::path::{ComparePath, Segment};
use crate::schema::{Field, SchemaNode};

/// Borrowed view of one field declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRef<'a> {
    pub name: Option<&'a str>,
    pub node: &'a SchemaNode,
}

impl<'a> From<&'a Field> for FieldRef<'a> {
    fn from(f: &'a Field) -> Self {
        FieldRef {
            name: f.name.as_deref(),
            node: &f.node,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scope<'a> {
    fields: &'a [Field],
    owner: Option<FieldRef<'a>>,
    parent: Option<&'a Scope<'a>>,
}

/// Result of walking a compare path.
#[derive(Debug, Clone, Copy)]
pub enum Resolved<'a> {
    Scope(&'a Scope<'a>),
    Field(FieldRef<'a>),
}

impl<'a> Scope<'a> {
    /// Scope of a top-level entry: no fields, no parent.
    pub fn root() -> Self {
        Scope::default()
    }

    /// Scope for field `index` of `fields`, compiled inside `parent`.
    pub fn for_field(parent: &'a Scope<'a>, fields: &'a [Field], index: usize) -> Self {
        let end = (index + 1).min(fields.len());
        Scope {
            fields: &fields[..end],
            owner: fields.get(index).map(FieldRef::from),
            parent: Some(parent),
        }
    }

    /// The field this scope was built for.
    pub fn owner(&self) -> Option<FieldRef<'a>> {
        self.owner
    }

    pub fn parent(&self) -> Option<&'a Scope<'a>> {
        self.parent
    }

    /// Number of parent links above this scope.
    pub fn depth(&self) -> usize {
        let mut n = 0;
        let mut cur = self.parent;
        while let Some(s) = cur {
            n += 1;
            cur = s.parent;
        }
        n
    }

    /// Direct-name lookup among the visible fields of this scope only.
    /// The latest declaration wins when a name repeats.
    pub fn lookup(&self, name: &str) -> Option<FieldRef<'a>> {
        self.fields
            .iter()
            .rev()
            .find(|f| f.name.as_deref() == Some(name))
            .map(FieldRef::from)
    }

    /// Resolve a compare path string against this scope.
    pub fn resolve<'s>(&'s self, path: &str) -> Result<Resolved<'s>, CompileError> {
        let parsed = ComparePath::parse(path)?;
        self.resolve_path(&parsed)
    }

    /// Walk the primary alternative of `path`: `..` moves to the parent scope,
    /// `.` stays, a name looks up a field of the current scope (or a member of
    /// the current field when it is a container).
    pub fn resolve_path<'s>(&'s self, path: &ComparePath) -> Result<Resolved<'s>, CompileError> {
        let mut current: Resolved<'s> = Resolved::Scope(self);
        for segment in path.primary() {
            current = match (segment, current) {
                (Segment::Current, c) => c,
                (Segment::Parent, Resolved::Scope(s)) => match s.parent {
                    Some(p) => Resolved::Scope(p),
                    None => return Err(CompileError::broken(&path.text, "`..` above the root scope")),
                },
                (Segment::Parent, Resolved::Field(f)) => {
                    return Err(CompileError::broken(
                        &path.text,
                        format!("`..` after field `{}`", f.name.unwrap_or("<anonymous>")),
                    ))
                }
                (Segment::Name(_), Resolved::Scope(s)) => {
                    let name = segment.field_name().unwrap_or_default();
                    match s.lookup(name) {
                        Some(f) => Resolved::Field(f),
                        None => {
                            return Err(CompileError::broken(
                                &path.text,
                                format!("no field `{}` in scope", name),
                            ))
                        }
                    }
                }
                (Segment::Name(_), Resolved::Field(f)) => {
                    let name = segment.field_name().unwrap_or_default();
                    let member = match f.node {
                        SchemaNode::Container(fields) => fields
                            .iter()
                            .rev()
                            .find(|m| m.name.as_deref() == Some(name))
                            .map(FieldRef::from),
                        _ => None,
                    };
                    match member {
                        Some(m) => Resolved::Field(m),
                        None => {
                            return Err(CompileError::broken(
                                &path.text,
                                format!(
                                    "field `{}` has no member `{}`",
                                    f.name.unwrap_or("<anonymous>"),
                                    name
                                ),
                            ))
                        }
                    }
                }
            };
        }
        Ok(current)
    }
}
