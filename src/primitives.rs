//! Primitive schema tokens and the TypeScript types they map to.
//!
//! Names missing from the table are not errors: they are forward references
//! to other top-level entries, left for the consumer's global name resolution.

use crate::expr::TypeExpr;

const NUMBER: &str = "number";
const BOOLEAN: &str = "boolean";
const STRING: &str = "string";
const BYTES: &str = "Uint8Array";
const VEC3: &str = "[number, number, number]";
const ANY: &str = "any";

static PRIMITIVES: &[(&str, &str)] = &[
    ("byterot", NUMBER),
    ("u8", NUMBER),
    ("u32", NUMBER),
    ("uint8", NUMBER),
    ("i8", NUMBER),
    ("i16", NUMBER),
    ("i32", NUMBER),
    ("li16", NUMBER),
    ("li32", NUMBER),
    ("li64", NUMBER),
    ("lu16", NUMBER),
    ("lu32", NUMBER),
    ("lu64", NUMBER),
    ("varint", NUMBER),
    ("zigzag32", NUMBER),
    ("zigzag64", NUMBER),
    ("lf32", NUMBER),
    ("lf64", NUMBER),
    ("f32", NUMBER),
    ("bool", BOOLEAN),
    ("pstring", STRING),
    ("buffer", BYTES),
    ("vec3f", VEC3),
    ("vec3i", VEC3),
    ("uuid", STRING),
    ("nbt", ANY),
    ("lnbt", ANY),
    ("lnbts", ANY),
    ("slot", ANY),
    ("varint64", NUMBER),
    ("LatinString", STRING),
    ("ByteArray", BYTES),
    ("enum_size_based_on_values_len", NUMBER),
    ("nbtLoop", ANY),
    ("LittleString", STRING),
    ("restBuffer", BYTES),
];

/// Table entry for `name`, if it is a primitive.
pub fn primitive(name: &str) -> Option<&'static str> {
    PRIMITIVES
        .iter()
        .find(|(token, _)| *token == name)
        .map(|(_, ty)| *ty)
}

pub fn is_primitive(name: &str) -> bool {
    primitive(name).is_some()
}

/// Type for a primitive token; unknown names become forward references.
pub fn lookup(name: &str) -> TypeExpr {
    match primitive(name) {
        Some(ty) => TypeExpr::Primitive(ty),
        None => TypeExpr::Reference(name.to_string()),
    }
}
