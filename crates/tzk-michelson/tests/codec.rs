// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Integration test: exercises the codec through its public API only.

use serde_json::{json, Value};
use tzk_michelson::{
    CreateConfig, Micheline, MichelsonError, RawValue, SchemaMeta, TypedValue,
};

const ALICE: &str = "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb";

fn schema(node: Value) -> SchemaMeta {
    let node: Micheline = serde_json::from_value(node).unwrap();
    SchemaMeta::from_micheline(&node).unwrap().unwrap()
}

fn build(meta: &SchemaMeta, input: Value) -> TypedValue {
    meta.create_value(input, &CreateConfig::default()).unwrap()
}

/// raw(native) == raw(wire(native)) read back through the same schema.
fn assert_round_trip(meta: &SchemaMeta, native: Value) {
    let first = build(meta, native.clone());
    let wire = first.to_micheline().unwrap();
    let second = meta
        .create_value(&wire, &CreateConfig::default())
        .unwrap_or_else(|e| panic!("re-reading {wire} failed: {e}"));
    assert_eq!(
        first.as_raw_value().unwrap(),
        second.as_raw_value().unwrap(),
        "round trip of {native}"
    );
}

// ── round trip ──

#[test]
fn primitives_round_trip() {
    let cases = [
        (json!({ "prim": "nat" }), json!(42)),
        (json!({ "prim": "int" }), json!("-7")),
        (json!({ "prim": "mutez" }), json!("1000000")),
        (json!({ "prim": "string" }), json!("hello")),
        (json!({ "prim": "bytes" }), json!("0xdeadbeef")),
        (json!({ "prim": "bool" }), json!(true)),
        (json!({ "prim": "unit" }), Value::Null),
        (json!({ "prim": "address" }), json!(ALICE)),
    ];
    for (node, native) in cases {
        assert_round_trip(&schema(node), native);
    }
}

#[test]
fn structured_values_round_trip() {
    let cases = [
        (
            json!({ "prim": "pair", "args": [{ "prim": "nat" }, { "prim": "string" }] }),
            json!([1, "one"]),
        ),
        (
            json!({ "prim": "option", "args": [{ "prim": "nat" }] }),
            json!(5),
        ),
        (
            json!({ "prim": "option", "args": [{ "prim": "nat" }] }),
            Value::Null,
        ),
        (
            json!({ "prim": "or", "args": [{ "prim": "nat" }, { "prim": "string" }] }),
            json!("Left 5"),
        ),
        (
            json!({ "prim": "list", "args": [{ "prim": "bytes" }] }),
            json!(["00", "ff01"]),
        ),
        (
            json!({ "prim": "map", "args": [{ "prim": "string" }, { "prim": "nat" }] }),
            json!({ "a": 1, "b": 2 }),
        ),
    ];
    for (node, native) in cases {
        assert_round_trip(&schema(node), native);
    }
}

#[test]
fn named_record_round_trip() {
    let meta = schema(json!({
        "prim": "pair",
        "args": [
            { "prim": "address", "annots": ["%to"] },
            { "prim": "pair", "args": [
                { "prim": "nat", "annots": ["%value"] },
                { "prim": "option", "args": [{ "prim": "string" }], "annots": ["%memo"] }
            ]}
        ]
    }));
    assert_round_trip(&meta, json!({ "to": ALICE, "value": 10, "memo": "rent" }));
}

// ── idempotence ──

#[test]
fn typed_input_is_not_rebuilt() {
    let meta = schema(json!({
        "prim": "pair",
        "args": [{ "prim": "nat", "annots": ["%a"] }, { "prim": "nat", "annots": ["%b"] }]
    }));
    let once = build(&meta, json!({ "a": 1, "b": 2 }));
    let twice = meta.create_value(once.clone(), &CreateConfig::default()).unwrap();
    assert_eq!(once, twice);
}

// ── raw projection ──

#[test]
fn right_nested_record_flattens() {
    let meta = schema(json!({
        "prim": "pair",
        "args": [
            { "prim": "address", "annots": ["%owner"] },
            { "prim": "nat", "annots": ["%balance"] },
            { "prim": "bool", "annots": ["%frozen"] }
        ]
    }));
    let wire = json!({
        "prim": "Pair",
        "args": [{ "string": ALICE }, { "int": "300" }, { "prim": "False" }]
    });
    let raw = build(&meta, wire).as_raw_value().unwrap();
    assert_eq!(
        raw.to_json(),
        json!({ "owner": ALICE, "balance": "300", "frozen": false })
    );
}

#[test]
fn pair_with_one_named_side_stays_a_tuple() {
    let meta = schema(json!({
        "prim": "pair",
        "args": [{ "prim": "nat", "annots": ["%a"] }, { "prim": "nat" }]
    }));
    let raw = build(&meta, json!([1, 2])).as_raw_value().unwrap();
    assert_eq!(
        raw,
        RawValue::List(vec![
            RawValue::named("a", RawValue::Int(1.into())),
            RawValue::Int(2.into()),
        ])
    );
}

#[test]
fn annotation_picks_field_from_object() {
    let meta = schema(json!({ "prim": "nat", "annots": ["%y"] }));
    let value = build(&meta, json!({ "x": 1, "y": 2 }));
    assert_eq!(
        value.as_raw_value().unwrap(),
        RawValue::named("y", RawValue::Int(2.into()))
    );
}

// ── errors ──

#[test]
fn mismatch_names_variant_and_actual_type() {
    let meta = schema(json!({ "prim": "string" }));
    let err = meta
        .create_value(json!(12), &CreateConfig::default())
        .unwrap_err();
    match err {
        MichelsonError::InvalidValue(message) => {
            assert!(message.starts_with("string"), "{message}");
            assert!(message.contains("number"), "{message}");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unknown_schema_tag_fails_only_when_building() {
    let node: Micheline = serde_json::from_value(json!({
        "prim": "pair",
        "args": [
            { "prim": "ticket", "args": [{ "prim": "nat" }], "annots": ["%ticket"] },
            { "prim": "nat", "annots": ["%amount"] }
        ]
    }))
    .unwrap();
    let meta = SchemaMeta::from_micheline(&node).unwrap().unwrap();
    assert!(matches!(
        meta.create_value(json!({ "ticket": 1, "amount": 2 }), &CreateConfig::default()),
        Err(MichelsonError::Unsupported(_))
    ));
}

// ── packing ──

#[test]
fn string_packs_with_tag_and_length() {
    let value = TypedValue::string("a").unwrap();
    assert_eq!(value.encode().unwrap(), vec![0x01, 0, 0, 0, 1, b'a']);
}

#[test]
fn bool_and_map_do_not_pack() {
    let bool_value = build(&schema(json!({ "prim": "bool" })), json!(false));
    assert!(matches!(bool_value.encode(), Err(MichelsonError::Unsupported(_))));

    let map_value = build(
        &schema(json!({ "prim": "map", "args": [{ "prim": "string" }, { "prim": "nat" }] })),
        json!({ "k": 1 }),
    );
    assert!(matches!(map_value.encode(), Err(MichelsonError::Unsupported(_))));
}

#[test]
fn big_map_key_hash_is_stable() {
    let meta = schema(json!({ "prim": "address" }));
    let a = build(&meta, json!(ALICE)).script_expr_hash().unwrap();
    let b = build(&meta, json!({ "string": ALICE })).script_expr_hash().unwrap();
    assert_eq!(a, b);
    assert!(a.starts_with("expr"));
}
