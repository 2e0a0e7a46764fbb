//! TypeScript type expressions produced by the compiler.
//!
//! Expressions are built as a small tree and rendered through [`fmt::Display`],
//! so every rendered expression is self-contained: operands are parenthesized
//! wherever TypeScript precedence would otherwise change their meaning.

use std::fmt::{self, Write};

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// Leaf type from the primitive table, rendered verbatim.
    Primitive(&'static str),
    /// Forward reference to another top-level entry by name.
    Reference(String),
    StringLiteral(String),
    BooleanLiteral(bool),
    Record(Vec<Member>),
    Array(Box<TypeExpr>),
    /// Empty union renders as `never`.
    Union(Vec<TypeExpr>),
    Intersection(Vec<TypeExpr>),
    /// Inner type followed by a `/* note */` comment; no structural effect.
    Annotated { inner: Box<TypeExpr>, note: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub key: String,
    pub ty: TypeExpr,
}

/// Marker for an absent optional value.
pub const ABSENT: TypeExpr = TypeExpr::Primitive("undefined");

impl Member {
    pub fn new(key: impl Into<String>, ty: TypeExpr) -> Self {
        Member { key: key.into(), ty }
    }
}

impl TypeExpr {
    pub fn array(element: TypeExpr) -> Self {
        TypeExpr::Array(Box::new(element))
    }

    pub fn optional(inner: TypeExpr) -> Self {
        TypeExpr::Union(vec![inner, ABSENT])
    }

    pub fn annotated(inner: TypeExpr, note: impl Into<String>) -> Self {
        TypeExpr::Annotated {
            inner: Box::new(inner),
            note: note.into(),
        }
    }

    /// Collect every forward-reference name in this expression.
    pub fn references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeExpr::Reference(name) => out.push(name),
            TypeExpr::Record(members) => members.iter().for_each(|m| m.ty.references(out)),
            TypeExpr::Array(e) => e.references(out),
            TypeExpr::Union(parts) | TypeExpr::Intersection(parts) => {
                parts.iter().for_each(|p| p.references(out))
            }
            TypeExpr::Annotated { inner, .. } => inner.references(out),
            TypeExpr::Primitive(_) | TypeExpr::StringLiteral(_) | TypeExpr::BooleanLiteral(_) => {}
        }
    }

    /// Single-operand unions and intersections render as their operand.
    fn effective(&self) -> &TypeExpr {
        match self {
            TypeExpr::Union(parts) | TypeExpr::Intersection(parts) if parts.len() == 1 => {
                parts[0].effective()
            }
            other => other,
        }
    }

    fn is_compound_union(&self) -> bool {
        matches!(self.effective(), TypeExpr::Union(p) if p.len() > 1)
    }

    fn needs_parens_as_element(&self) -> bool {
        match self.effective() {
            TypeExpr::Union(p) | TypeExpr::Intersection(p) => p.len() > 1,
            TypeExpr::Annotated { .. } => true,
            _ => false,
        }
    }

    /// Render at the given indentation depth (two spaces per level).
    pub fn render<W: Write>(&self, out: &mut W, indent: usize) -> fmt::Result {
        match self {
            TypeExpr::Primitive(ty) => out.write_str(ty),
            TypeExpr::Reference(name) => out.write_str(name),
            TypeExpr::StringLiteral(s) => write_string_literal(out, s),
            TypeExpr::BooleanLiteral(b) => write!(out, "{}", b),
            TypeExpr::Record(members) => {
                if members.is_empty() {
                    return out.write_str("{}");
                }
                out.write_str("{\n")?;
                for m in members {
                    write_indent(out, indent + 1)?;
                    write_key(out, &m.key)?;
                    out.write_str(": ")?;
                    m.ty.render(out, indent + 1)?;
                    out.write_char('\n')?;
                }
                write_indent(out, indent)?;
                out.write_char('}')
            }
            TypeExpr::Array(element) => {
                if element.needs_parens_as_element() {
                    out.write_char('(')?;
                    element.render(out, indent)?;
                    out.write_char(')')?;
                } else {
                    element.render(out, indent)?;
                }
                out.write_str("[]")
            }
            TypeExpr::Union(parts) => {
                if parts.is_empty() {
                    return out.write_str("never");
                }
                for (i, p) in parts.iter().enumerate() {
                    if i > 0 {
                        out.write_str(" | ")?;
                    }
                    p.render(out, indent)?;
                }
                Ok(())
            }
            TypeExpr::Intersection(parts) => {
                if parts.is_empty() {
                    return out.write_str("unknown");
                }
                for (i, p) in parts.iter().enumerate() {
                    if i > 0 {
                        out.write_str(" & ")?;
                    }
                    if parts.len() > 1 && p.is_compound_union() {
                        out.write_char('(')?;
                        p.render(out, indent)?;
                        out.write_char(')')?;
                    } else {
                        p.render(out, indent)?;
                    }
                }
                Ok(())
            }
            TypeExpr::Annotated { inner, note } => {
                inner.render(out, indent)?;
                write!(out, " /* {} */", note.replace("*/", "* /"))
            }
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}

pub(crate) fn write_indent<W: Write>(out: &mut W, indent: usize) -> fmt::Result {
    for _ in 0..indent {
        out.write_str("  ")?;
    }
    Ok(())
}

fn write_string_literal<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('\'')?;
    for c in s.chars() {
        match c {
            '\'' => out.write_str("\\'")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\u{2028}' => out.write_str("\\u2028")?,
            '\u{2029}' => out.write_str("\\u2029")?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('\'')
}

/// Whether `s` can be written as a bare TypeScript property name.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn write_key<W: Write>(out: &mut W, key: &str) -> fmt::Result {
    if is_identifier(key) {
        out.write_str(key)
    } else {
        write_string_literal(out, key)
    }
}
