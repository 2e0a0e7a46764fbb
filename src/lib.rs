//! # protodef-ts — TypeScript typings for protodef protocol schemas
//!
//! Compiles a protodef-style protocol definition (the JSON format used by
//! minecraft-data's `protocol.json`) into TypeScript type declarations that
//! describe the *shape* of every packet and type. No encode/decode logic is
//! produced.
//!
//! ## Node kinds
//!
//! - Primitives: `varint`, `li32`, `bool`, `pstring`, `buffer`, `vec3f`, ...
//!   (see [`primitives`]); any other name is a reference to another entry
//! - `container`: record with fields in declaration order
//! - `switch`: discriminated union over a sibling or ancestor field
//! - `mapper`: union of string literals
//! - `array`, `option`, `bitflags`, `bitfield`, `encapsulated`
//!
//! ## Example
//!
//! ```text
//! { "types": {
//!     "varint": "native",
//!     "packet_move": ["container", [
//!       { "name": "position", "type": "vec3f" },
//!       { "name": "on_ground", "type": "bool" }
//!     ]]
//! } }
//! ```
//!
//! becomes
//!
//! ```text
//! export type packet_move = {
//!   position: [number, number, number]
//!   on_ground: boolean
//! }
//! ```
//!
//! ## Two-phase contract
//!
//! Names that are neither primitives nor compiled inline are emitted as bare
//! type references; the TypeScript compiler resolves them across the whole
//! document. [`Document::unresolved_references`] lists the ones this document
//! does not declare.
//!
//! ## Usage
//!
//! Run the `protodef-ts` binary on a `protocol.json`, or call [`generate`].

pub mod compiler;
pub mod document;
pub mod error;
pub mod expr;
pub mod path;
pub mod primitives;
pub mod schema;
pub mod scope;
pub mod switch;

pub use compiler::{AnonymousFields, CompileOptions, Compiler};
pub use document::{
    compile_entry, generate, Declaration, Document, DocumentError, EntryFailure, ErrorPolicy, Protocol,
};
pub use error::CompileError;
pub use expr::{Member, TypeExpr};
pub use schema::{Field, Flags, SchemaNode, Switch};
pub use scope::{FieldRef, Resolved, Scope};
