//! Discriminated unions: arm construction, discriminant classification, and
//! reference failures.

use pretty_assertions::assert_eq;
use protodef_ts::{AnonymousFields, CompileError, CompileOptions, Compiler, Member, SchemaNode, Scope, TypeExpr};
use serde_json::{json, Value};

fn compile_with(compiler: &Compiler, v: Value) -> Result<TypeExpr, CompileError> {
    let node = SchemaNode::from_json(&v)?;
    compiler.compile(&node, &Scope::root())
}

fn compile(v: Value) -> Result<TypeExpr, CompileError> {
    compile_with(&Compiler::default(), v)
}

fn packet(switch: Value) -> Value {
    json!(["container", [
        { "name": "packetType", "type": "varint" },
        { "name": "payload", "type": switch }
    ]])
}

#[test]
fn two_arms_intersected_with_container() {
    let out = compile(packet(json!(["switch", {
        "compareTo": "packetType",
        "fields": {
            "1": ["container", [{ "name": "a", "type": "u8" }]],
            "2": ["container", [{ "name": "b", "type": "bool" }]]
        }
    }])))
    .expect("compile")
    .to_string();

    let expected = "\
{
  packetType: number
} & ({
  packetType: '1'
  payload: {
    a: number
  }
} | {
  packetType: '2'
  payload: {
    b: boolean
  }
})";
    assert_eq!(out, expected);
}

#[test]
fn arm_count_includes_default_and_keeps_order() {
    let e = compile(packet(json!(["switch", {
        "compareTo": "packetType",
        "fields": { "9": "u8", "3": "lf32", "5": "bool" },
        "default": "void"
    }])))
    .expect("compile");

    let TypeExpr::Intersection(parts) = e else { panic!("expected intersection") };
    let TypeExpr::Union(arms) = &parts[1] else { panic!("expected union") };
    assert_eq!(arms.len(), 4);

    let keys: Vec<String> = arms[..3]
        .iter()
        .map(|arm| match arm {
            TypeExpr::Record(m) => m[0].ty.to_string(),
            other => panic!("unexpected arm {:?}", other),
        })
        .collect();
    assert_eq!(keys, vec!["'9'", "'3'", "'5'"]);
    assert_eq!(arms[3].to_string(), "{\n  payload: void\n}");
}

#[test]
fn true_arm_on_boolean_field() {
    let out = compile(json!(["container", [
        { "name": "has_name", "type": "bool" },
        { "name": "name", "type": ["switch", { "compareTo": "has_name", "fields": { "true": "pstring" } }] }
    ]]))
    .expect("compile")
    .to_string();
    assert!(out.contains("has_name: true\n  name: string"), "{}", out);
}

#[test]
fn true_arm_on_inline_enumeration_uses_literal() {
    let out = compile(json!(["container", [
        { "name": "mode", "type": ["mapper", { "type": "u8", "mappings": { "0": "off", "1": "on" } }] },
        { "name": "extra", "type": ["switch", { "compareTo": "mode", "fields": { "true": "u8" } }] }
    ]]))
    .expect("compile")
    .to_string();
    assert!(out.contains("mode: 'true'\n  extra: number"), "{}", out);
}

#[test]
fn true_arm_on_named_type_uses_member_alternatives() {
    let out = compile(json!(["container", [
        { "name": "flags", "type": "UpdateFlags" },
        { "name": "rotation", "type": ["switch", {
            "compareTo": "flags.has_yaw||flags.has_pitch",
            "fields": { "true": "vec3f" }
        }] }
    ]]))
    .expect("compile")
    .to_string();
    assert!(
        out.contains("flags: UpdateFlags.has_yaw | UpdateFlags.has_pitch\n  rotation: [number, number, number]"),
        "{}",
        out
    );
}

#[test]
fn true_arm_on_named_type_without_member() {
    let out = compile(json!(["container", [
        { "name": "flags", "type": "UpdateFlags" },
        { "name": "data", "type": ["switch", { "compareTo": "flags", "fields": { "true": "u8" } }] }
    ]]))
    .expect("compile")
    .to_string();
    assert!(out.contains("flags: UpdateFlags\n  data: number"), "{}", out);
}

#[test]
fn true_arm_through_parent_path_uses_member() {
    let out = compile(json!(["container", [
        { "name": "flags", "type": "UpdateFlags" },
        { "name": "body", "type": ["container", [
            { "name": "rotation", "type": ["switch", {
                "compareTo": "../flags.has_yaw",
                "fields": { "true": "lf32" }
            }] }
        ]] }
    ]]))
    .expect("compile")
    .to_string();
    assert!(out.contains("flags: UpdateFlags.has_yaw\n    rotation: number"), "{}", out);
}

#[test]
fn parent_reference_resolves_to_ancestor_field() {
    let out = compile(json!(["container", [
        { "name": "action", "type": "varint" },
        { "name": "body", "type": ["container", [
            { "name": "detail", "type": ["switch", { "compareTo": "../action", "fields": { "0": "u8" } }] }
        ]] }
    ]]))
    .expect("compile")
    .to_string();
    assert!(out.contains("action: '0'\n    detail: number"), "{}", out);
}

#[test]
fn broken_parent_reference() {
    let err = compile(packet(json!(["switch", { "compareTo": "../missing", "fields": { "1": "u8" } }]))).unwrap_err();
    assert!(matches!(err, CompileError::BrokenReference { ref path, .. } if path == "../missing"), "{:?}", err);
}

#[test]
fn parent_above_root_is_broken() {
    let err = compile(packet(json!(["switch", { "compareTo": "../../../x", "fields": { "1": "u8" } }]))).unwrap_err();
    assert!(matches!(err, CompileError::BrokenReference { .. }), "{:?}", err);
}

#[test]
fn true_arm_without_compared_field_is_unresolved() {
    let err = compile(packet(json!(["switch", { "compareTo": "nope", "fields": { "true": "u8" } }]))).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnresolvedDiscriminant {
            path: "nope".into(),
            field: "nope".into()
        }
    );
}

#[test]
fn later_sibling_is_not_visible() {
    let err = compile(json!(["container", [
        { "name": "data", "type": ["switch", { "compareTo": "kind", "fields": { "true": "u8" } }] },
        { "name": "kind", "type": "bool" }
    ]]))
    .unwrap_err();
    assert!(matches!(err, CompileError::UnresolvedDiscriminant { .. }));
}

#[test]
fn switch_outside_container_is_plain_union() {
    let out = compile(json!(["array", { "countType": "varint", "type": ["switch", {
        "compareTo": "kind",
        "fields": { "1": "u8" },
        "default": "pstring"
    }] }]))
    .expect("compile")
    .to_string();
    assert_eq!(out, "({\n  kind: '1'\n} & number | string)[]");
}

#[test]
fn anonymous_switch_is_flattened_into_parent() {
    let compiler = Compiler::new(CompileOptions {
        anonymous_fields: AnonymousFields::Flatten,
        ..CompileOptions::default()
    });
    let out = compile_with(&compiler, json!(["container", [
        { "name": "kind", "type": "u8" },
        { "anon": true, "type": ["switch", { "compareTo": "kind", "fields": {
            "1": ["container", [{ "name": "x", "type": "u8" }]]
        } }] }
    ]]))
    .expect("compile")
    .to_string();
    assert_eq!(out, "{\n  kind: number\n} & {\n  kind: '1'\n} & {\n  x: number\n}");
}

#[test]
fn empty_switch_is_never() {
    let out = compile(packet(json!(["switch", { "compareTo": "packetType", "fields": {} }])))
        .expect("compile")
        .to_string();
    assert_eq!(out, "{\n  packetType: number\n} & never");
}

fn unowned_arm(condition: Member, value: TypeExpr) -> TypeExpr {
    TypeExpr::Intersection(vec![TypeExpr::Record(vec![condition]), value])
}

#[test]
fn switch_inside_array_field_is_not_keyed_by_the_field() {
    let e = compile(json!(["container", [
        { "name": "kind", "type": "varint" },
        { "name": "items", "type": ["array", { "countType": "varint", "type": ["switch", {
            "compareTo": "kind",
            "fields": { "1": "u8", "2": "bool" }
        }] }] }
    ]]))
    .expect("compile");

    let TypeExpr::Record(members) = e else { panic!("expected record") };
    assert_eq!(members[1].key, "items");
    assert_eq!(
        members[1].ty,
        TypeExpr::array(TypeExpr::Union(vec![
            unowned_arm(Member::new("kind", TypeExpr::StringLiteral("1".into())), TypeExpr::Primitive("number")),
            unowned_arm(Member::new("kind", TypeExpr::StringLiteral("2".into())), TypeExpr::Primitive("boolean")),
        ]))
    );
}

#[test]
fn switch_inside_option_field_is_not_keyed_by_the_field() {
    let e = compile(json!(["container", [
        { "name": "has", "type": "bool" },
        { "name": "x", "type": ["option", ["switch", { "compareTo": "has", "fields": { "true": "u8" } }]] }
    ]]))
    .expect("compile");

    let TypeExpr::Record(members) = e else { panic!("expected record") };
    assert_eq!(members[1].key, "x");
    assert_eq!(
        members[1].ty,
        TypeExpr::optional(TypeExpr::Union(vec![unowned_arm(
            Member::new("has", TypeExpr::BooleanLiteral(true)),
            TypeExpr::Primitive("number"),
        )]))
    );
}
