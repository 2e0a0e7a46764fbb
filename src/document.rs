//! Protocol loading and document assembly.
//!
//! Every top-level entry is compiled in isolation. A failing entry is reported
//! (name, error, raw node) and skipped; the rest of the document is still
//! produced unless [`ErrorPolicy::Abort`] is selected.

use crate::compiler::{flag_constants, CompileOptions, Compiler};
use crate::error::CompileError;
use crate::expr::{write_indent, TypeExpr};
use crate::schema::SchemaNode;
use crate::scope::Scope;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use tracing::{debug, error, warn};

/// Entry name that is never compiled (the consumer's own `string`).
const RESERVED: &str = "string";

/// What [`generate`] does when one entry fails to compile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Report the entry, skip it, keep compiling the rest.
    #[default]
    SkipEntry,
    /// Stop at the first failing entry and produce no document.
    Abort,
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("invalid protocol JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no type mapping at `{0}`")]
    MissingTypes(String),
}

/// Top-level entries of a protocol, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Protocol {
    entries: Vec<(String, Value)>,
}

impl Protocol {
    pub fn from_json_str(source: &str) -> Result<Self, DocumentError> {
        Self::from_value(serde_json::from_str(source)?, "")
    }

    /// Take the entry mapping from `root`. `namespace` is a `/`-separated
    /// object path (e.g. `toClient`); at the end of it, a `types` member is
    /// used when present, otherwise the object itself.
    pub fn from_value(root: Value, namespace: &str) -> Result<Self, DocumentError> {
        let mut current = root;
        for key in namespace.split('/').filter(|k| !k.is_empty()) {
            current = match current {
                Value::Object(mut map) => map
                    .remove(key)
                    .ok_or_else(|| DocumentError::MissingTypes(namespace.to_string()))?,
                _ => return Err(DocumentError::MissingTypes(namespace.to_string())),
            };
        }
        let map = match current {
            Value::Object(mut map) => match map.remove("types") {
                Some(Value::Object(types)) => types,
                Some(_) => return Err(DocumentError::MissingTypes(namespace.to_string())),
                None => map,
            },
            _ => return Err(DocumentError::MissingTypes(namespace.to_string())),
        };
        Ok(Protocol {
            entries: map.into_iter().collect(),
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Protocol {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        Protocol {
            entries: iter.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }
}

/// One top-level declaration of the output.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    TypeAlias { name: String, ty: TypeExpr },
    /// Bitflag set declared as named integer constants.
    ConstEnum { name: String, constants: Vec<(String, String)> },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::TypeAlias { name, .. } | Declaration::ConstEnum { name, .. } => name,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::TypeAlias { name, ty } => write!(f, "export type {} = {}", name, ty),
            Declaration::ConstEnum { name, constants } => {
                if constants.is_empty() {
                    return write!(f, "export const enum {} {{}}", name);
                }
                writeln!(f, "export const enum {} {{", name)?;
                for (i, (n, v)) in constants.iter().enumerate() {
                    write_indent(f, 1)?;
                    write!(f, "{} = {}", n, v)?;
                    if i + 1 < constants.len() {
                        f.write_str(",")?;
                    }
                    f.write_str("\n")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// A top-level entry that failed to compile.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to compile `{name}`: {error}")]
pub struct EntryFailure {
    pub name: String,
    #[source]
    pub error: CompileError,
    /// The raw schema node, for the report.
    pub node: Value,
}

/// Result of one generation run.
#[derive(Debug, Clone, Default)]
pub struct Document {
    declarations: Vec<Declaration>,
    failures: Vec<EntryFailure>,
    skipped: Vec<String>,
}

impl Document {
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn failures(&self) -> &[EntryFailure] {
        &self.failures
    }

    /// Entries left out on purpose: string aliases and the reserved name.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Forward-reference names that no declaration or skipped alias supplies,
    /// sorted. `Type.member` references count as references to `Type`. The
    /// consumer must resolve these globally.
    pub fn unresolved_references(&self) -> Vec<&str> {
        let known: HashSet<&str> = self
            .declarations
            .iter()
            .map(Declaration::name)
            .chain(self.skipped.iter().map(String::as_str))
            .collect();
        let mut refs = Vec::new();
        for d in &self.declarations {
            if let Declaration::TypeAlias { ty, .. } = d {
                ty.references(&mut refs);
            }
        }
        refs.into_iter()
            .map(|r| r.split('.').next().unwrap_or(r))
            .filter(|r| !known.contains(r))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// The output text: declarations in entry order, then a blank separator.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.declarations {
            writeln!(f, "{}", d)?;
        }
        f.write_str("\n\n")
    }
}

/// Compile a single named entry.
pub fn compile_entry(compiler: &Compiler, name: &str, raw: &Value) -> Result<Declaration, CompileError> {
    let node = SchemaNode::from_json(raw)?;
    match node {
        SchemaNode::Bitflags(flags) => Ok(Declaration::ConstEnum {
            name: name.to_string(),
            constants: flag_constants(&flags)
                .into_iter()
                .map(|(n, v)| (n.to_string(), v))
                .collect(),
        }),
        node => Ok(Declaration::TypeAlias {
            name: name.to_string(),
            ty: compiler.compile(&node, &Scope::root())?,
        }),
    }
}

/// Compile every entry of `protocol` into a document.
///
/// With [`ErrorPolicy::SkipEntry`] this always succeeds and failures are
/// listed in [`Document::failures`]; with [`ErrorPolicy::Abort`] the first
/// failure is returned instead.
pub fn generate(protocol: &Protocol, options: CompileOptions) -> Result<Document, EntryFailure> {
    let compiler = Compiler::new(options).with_entries(protocol.entries().map(|(n, _)| n));
    let mut doc = Document::default();

    for (name, raw) in protocol.entries() {
        if raw.is_string() || name == RESERVED {
            doc.skipped.push(name.to_string());
            continue;
        }
        match compile_entry(&compiler, name, raw) {
            Ok(decl) => {
                debug!(entry = name, "compiled");
                doc.declarations.push(decl);
            }
            Err(e) => {
                error!(entry = name, error = %e, node = %raw, "failed to compile entry");
                let failure = EntryFailure {
                    name: name.to_string(),
                    error: e,
                    node: raw.clone(),
                };
                if options.on_error == ErrorPolicy::Abort {
                    return Err(failure);
                }
                doc.failures.push(failure);
            }
        }
    }

    let unresolved = doc.unresolved_references();
    if !unresolved.is_empty() {
        warn!(count = unresolved.len(), names = ?unresolved, "forward references without a declaration");
    }
    Ok(doc)
}
