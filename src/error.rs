//! Error taxonomy for schema compilation.

/// Failure while compiling one schema node.
///
/// Raised during compilation of a single top-level entry and caught at that
/// entry's boundary by the [document assembler](crate::document).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A compare path could not be walked through the context chain.
    #[error("broken reference `{path}`: {reason}")]
    BrokenReference { path: String, reason: String },
    /// The field a discriminant compares against is not in the enclosing container.
    #[error("unresolved discriminant `{path}`: no field `{field}` in the enclosing container")]
    UnresolvedDiscriminant { path: String, field: String },
    #[error("unsupported schema node kind `{kind}`")]
    UnsupportedNode { kind: String },
    /// A recognized kind whose options are missing or have the wrong shape.
    #[error("malformed `{kind}` node: {reason}")]
    MalformedNode { kind: String, reason: String },
}

impl CompileError {
    pub(crate) fn broken(path: &str, reason: impl Into<String>) -> Self {
        CompileError::BrokenReference {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(kind: impl Into<String>) -> Self {
        CompileError::UnsupportedNode { kind: kind.into() }
    }

    pub(crate) fn malformed(kind: &str, reason: impl Into<String>) -> Self {
        CompileError::MalformedNode {
            kind: kind.to_string(),
            reason: reason.into(),
        }
    }
}
