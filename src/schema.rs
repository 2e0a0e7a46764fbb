//! Schema node model for protodef-style protocol definitions, and the loader
//! that builds it from the JSON protocol document.
//!
//! A node is either a JSON string (a primitive or a reference to another
//! top-level entry) or a `[kind, options]` pair:
//!
//! ```text
//! ["container", [{ "name": "id", "type": "varint" }, { "anon": true, "type": [...] }]]
//! ["switch", { "compareTo": "../type", "fields": { "1": "u8" }, "default": "void" }]
//! ["mapper", { "type": "varint", "mappings": { "0": "idle", "1": "busy" } }]
//! ["array", { "countType": "varint", "type": "u8" }]
//! ["option", "pstring"]
//! ["bitflags", { "type": "lu32", "flags": ["a", "b"] }]
//! ["bitfield", [{ "name": "x", "size": 26, "signed": true }]]
//! ["encapsulated", { "lengthType": "varint", "type": "nbt" }]
//! ```

use crate::error::CompileError;
use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// One node of the protocol definition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Primitive token or forward reference to a top-level entry.
    Primitive(String),
    Container(Vec<Field>),
    Switch(Switch),
    /// Closed set of literal tags (protodef `mapper`).
    Enumeration(Vec<String>),
    Array(Box<SchemaNode>),
    Optional(Box<SchemaNode>),
    Bitflags(Flags),
    /// Fixed-width numeric sub-fields, by name.
    Bitfield(Vec<String>),
    /// Value preceded by a length descriptor (protodef `encapsulated`).
    LengthPrefixed {
        length_kind: String,
        inner: Box<SchemaNode>,
    },
    /// `[kind, options]` pair whose kind is not one of the compound kinds above,
    /// e.g. `["pstring", { "countType": "varint" }]`.
    Parametrized { kind: String },
}

/// Container field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// `None` only for anonymous fields.
    pub name: Option<String>,
    pub node: SchemaNode,
    pub anonymous: bool,
}

/// Discriminated union over a compared field.
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub compare_to: String,
    /// Discriminant literal (or `"true"`) to sub-schema, in declaration order.
    pub arms: Vec<(String, SchemaNode)>,
    pub default: Option<Box<SchemaNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Flags {
    /// Plain list: values are ascending indices from 0.
    Sequence(Vec<String>),
    /// Explicit values, kept verbatim.
    Mapping(Vec<(String, Number)>),
}

impl SchemaNode {
    /// Short name of the node kind, as written in the schema.
    pub fn kind(&self) -> &str {
        match self {
            SchemaNode::Primitive(name) => name,
            SchemaNode::Container(_) => "container",
            SchemaNode::Switch(_) => "switch",
            SchemaNode::Enumeration(_) => "mapper",
            SchemaNode::Array(_) => "array",
            SchemaNode::Optional(_) => "option",
            SchemaNode::Bitflags(_) => "bitflags",
            SchemaNode::Bitfield(_) => "bitfield",
            SchemaNode::LengthPrefixed { .. } => "encapsulated",
            SchemaNode::Parametrized { kind } => kind,
        }
    }

    /// Build a node from its JSON form.
    pub fn from_json(value: &Value) -> Result<Self, CompileError> {
        match value {
            Value::String(name) => Ok(SchemaNode::Primitive(name.clone())),
            Value::Array(items) => {
                let kind = match items.first() {
                    Some(Value::String(k)) => k.as_str(),
                    Some(other) => return Err(CompileError::unsupported(json_kind(other))),
                    None => return Err(CompileError::unsupported("empty array")),
                };
                let options = items.get(1).unwrap_or(&NO_OPTIONS);
                build_compound(kind, options)
            }
            other => Err(CompileError::unsupported(json_kind(other))),
        }
    }
}

static NO_OPTIONS: Value = Value::Null;

#[derive(Deserialize)]
struct RawField {
    name: Option<String>,
    #[serde(rename = "type")]
    node: Value,
    #[serde(default)]
    anon: bool,
}

#[derive(Deserialize)]
struct RawSwitch {
    #[serde(rename = "compareTo")]
    compare_to: String,
    #[serde(default)]
    fields: Map<String, Value>,
    default: Option<Value>,
}

#[derive(Deserialize)]
struct RawMapper {
    mappings: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawTyped {
    #[serde(rename = "type")]
    node: Value,
}

#[derive(Deserialize)]
struct RawBitflags {
    flags: Value,
}

#[derive(Deserialize)]
struct RawBitfieldMember {
    name: String,
}

#[derive(Deserialize)]
struct RawEncapsulated {
    #[serde(rename = "lengthType")]
    length_type: String,
    #[serde(rename = "type")]
    node: Value,
}

fn options<T: for<'de> Deserialize<'de>>(kind: &str, options: &Value) -> Result<T, CompileError> {
    T::deserialize(options).map_err(|e| CompileError::malformed(kind, e.to_string()))
}

fn build_compound(kind: &str, opts: &Value) -> Result<SchemaNode, CompileError> {
    match kind {
        "container" => {
            let raw: Vec<RawField> = options(kind, opts)?;
            let mut fields = Vec::with_capacity(raw.len());
            for f in raw {
                if f.name.is_none() && !f.anon {
                    return Err(CompileError::malformed(kind, "field without a name must be anonymous"));
                }
                fields.push(Field {
                    name: f.name,
                    node: SchemaNode::from_json(&f.node)?,
                    anonymous: f.anon,
                });
            }
            Ok(SchemaNode::Container(fields))
        }
        "switch" => {
            let raw: RawSwitch = options(kind, opts)?;
            let mut arms = Vec::with_capacity(raw.fields.len());
            for (key, node) in &raw.fields {
                arms.push((key.clone(), SchemaNode::from_json(node)?));
            }
            let default = match &raw.default {
                Some(node) => Some(Box::new(SchemaNode::from_json(node)?)),
                None => None,
            };
            Ok(SchemaNode::Switch(Switch {
                compare_to: raw.compare_to,
                arms,
                default,
            }))
        }
        "mapper" => {
            let raw: RawMapper = options(kind, opts)?;
            let literals = raw
                .mappings
                .values()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            Ok(SchemaNode::Enumeration(literals))
        }
        "array" => {
            let raw: RawTyped = options(kind, opts)?;
            Ok(SchemaNode::Array(Box::new(SchemaNode::from_json(&raw.node)?)))
        }
        "option" => Ok(SchemaNode::Optional(Box::new(SchemaNode::from_json(opts)?))),
        "bitflags" => {
            let raw: RawBitflags = options(kind, opts)?;
            let flags = match raw.flags {
                Value::Array(names) => Flags::Sequence(
                    names
                        .into_iter()
                        .map(|n| match n {
                            Value::String(s) => Ok(s),
                            other => Err(CompileError::malformed(
                                kind,
                                format!("flag name must be a string, got {}", other),
                            )),
                        })
                        .collect::<Result<_, _>>()?,
                ),
                Value::Object(map) => Flags::Mapping(
                    map.into_iter()
                        .map(|(name, v)| match v {
                            Value::Number(n) => Ok((name, n)),
                            other => Err(CompileError::malformed(
                                kind,
                                format!("flag `{}` must have an integer value, got {}", name, other),
                            )),
                        })
                        .collect::<Result<_, _>>()?,
                ),
                other => {
                    return Err(CompileError::malformed(
                        kind,
                        format!("flags must be a list or an object, got {}", json_kind(&other)),
                    ))
                }
            };
            Ok(SchemaNode::Bitflags(flags))
        }
        "bitfield" => {
            let raw: Vec<RawBitfieldMember> = options(kind, opts)?;
            Ok(SchemaNode::Bitfield(raw.into_iter().map(|m| m.name).collect()))
        }
        "encapsulated" => {
            let raw: RawEncapsulated = options(kind, opts)?;
            Ok(SchemaNode::LengthPrefixed {
                length_kind: raw.length_type,
                inner: Box::new(SchemaNode::from_json(&raw.node)?),
            })
        }
        other => Ok(SchemaNode::Parametrized {
            kind: other.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
