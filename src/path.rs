//! Parse `compareTo` paths into segments using PEST.

use crate::error::CompileError;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "path.pest"]
struct PathParser;

/// One `/`-separated step of a compare path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `..`
    Parent,
    /// `.`
    Current,
    /// Field name, possibly followed by `.member` access (`flags.has_x`).
    Name(String),
}

impl Segment {
    /// Field part of a name segment: text before the first `.`.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Segment::Name(n) => Some(n.split('.').next().unwrap_or(n)),
            _ => None,
        }
    }

    /// Member access part of a name segment, if any.
    pub fn member(&self) -> Option<&str> {
        match self {
            Segment::Name(n) => n.split_once('.').map(|(_, m)| m).filter(|m| !m.is_empty()),
            _ => None,
        }
    }
}

/// Parsed `compareTo` expression: `||`-separated alternatives of segment paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparePath {
    pub text: String,
    pub alternatives: Vec<Vec<Segment>>,
}

impl ComparePath {
    pub fn parse(text: &str) -> Result<Self, CompileError> {
        let pairs = PathParser::parse(Rule::compare_expr, text)
            .map_err(|e| CompileError::broken(text, format!("parse error: {}", e)))?;
        let expr = pairs
            .into_iter()
            .next()
            .ok_or_else(|| CompileError::broken(text, "empty path"))?;

        let mut alternatives = Vec::new();
        for alt in expr.into_inner() {
            if alt.as_rule() != Rule::alternative {
                continue;
            }
            let segments = alt
                .into_inner()
                .filter_map(|seg| match seg.as_rule() {
                    Rule::parent => Some(Segment::Parent),
                    Rule::current => Some(Segment::Current),
                    Rule::name => Some(Segment::Name(seg.as_str().to_string())),
                    _ => None,
                })
                .collect();
            alternatives.push(segments);
        }
        Ok(ComparePath {
            text: text.to_string(),
            alternatives,
        })
    }

    /// First alternative; the one used to locate the compared field.
    pub fn primary(&self) -> &[Segment] {
        self.alternatives.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the path walks the context chain (`/` or `..`) rather than
    /// naming a field of the immediate scope.
    pub fn is_traversal(&self) -> bool {
        let primary = self.primary();
        primary.len() > 1 || primary.contains(&Segment::Parent)
    }

    /// Field named by the last segment of the primary alternative.
    pub fn target_name(&self) -> Option<&str> {
        self.primary().last().and_then(Segment::field_name)
    }
}
