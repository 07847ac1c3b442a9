//! Property tests for the analyzer and fallback synthesizer

use casegen_core::synthesizer::{fallback_cases, synthesize};
use casegen_core::{ResultEnvelope, analyze, sample};
use proptest::prelude::*;
use serde_json::{Map, Value, json};

const METHODS: [&str; 7] = ["get", "post", "put", "patch", "delete", "head", "options"];

/// Spec with the given path → method-subset layout.
fn build_spec(paths: &[(String, Vec<usize>)]) -> Value {
    let mut out = Map::new();
    for (path, methods) in paths {
        let mut item = Map::new();
        for &m in methods {
            item.insert(
                METHODS[m].to_string(),
                json!({
                    "parameters": [
                        {"name": "q", "in": "query", "schema": {"type": "string", "maxLength": 8}},
                        {"name": "n", "in": "query", "required": true, "schema": {"type": "integer", "minimum": 3}}
                    ],
                    "responses": {"200": {"description": "ok", "content": {"application/json": {
                        "schema": {"type": "object", "properties": {"id": {"type": "integer"}}}
                    }}}}
                }),
            );
        }
        out.insert(path.clone(), Value::Object(item));
    }
    json!({"openapi": "3.0.0", "paths": out})
}

fn layout() -> impl Strategy<Value = Vec<(String, Vec<usize>)>> {
    prop::collection::btree_map(
        "/[a-z]{1,8}",
        prop::collection::btree_set(0..METHODS.len(), 0..=METHODS.len()),
        0..6,
    )
    .prop_map(|m| {
        m.into_iter()
            .map(|(path, methods)| (path, methods.into_iter().collect()))
            .collect()
    })
}

proptest! {
    #[test]
    fn one_uniquely_keyed_case_per_operation(paths in layout()) {
        let spec = build_spec(&paths);
        let expected: usize = paths.iter().map(|(_, m)| m.len()).sum();

        let ops = analyze(&spec).unwrap();
        prop_assert_eq!(ops.len(), expected);

        let cases = fallback_cases(&ops);
        prop_assert_eq!(cases.len(), expected);
        for (i, (key, case)) in cases.iter().enumerate() {
            prop_assert_eq!(key, &format!("testcase{}", i + 1));
            prop_assert_eq!(&case.endpoint, &ops[i].path);
            prop_assert_eq!(&case.method, &ops[i].method);
        }
    }

    #[test]
    fn fallback_is_idempotent(paths in layout()) {
        let ops = analyze(&build_spec(&paths)).unwrap();
        for op in &ops {
            prop_assert_eq!(synthesize(op), synthesize(op));
        }
    }

    #[test]
    fn envelope_round_trips(paths in layout()) {
        let ops = analyze(&build_spec(&paths)).unwrap();
        let envelope = ResultEnvelope::success("ok", fallback_cases(&ops));
        let text = serde_json::to_string(&envelope).unwrap();
        let back: ResultEnvelope = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(back, envelope);
    }

    #[test]
    fn sampled_integers_validate(min in -1000i64..1000, span in 0i64..1000) {
        let schema = json!({"type": "integer", "minimum": min, "maximum": min + span});
        let value = sample::sample(&schema);
        prop_assert!(jsonschema::is_valid(&schema, &value));
    }
}

#[test]
fn mock_payloads_validate_against_their_schemas() {
    let schemas = [
        json!({"type": "string", "format": "email"}),
        json!({"type": "string", "minLength": 12, "maxLength": 20}),
        json!({"type": "number", "minimum": 2.5}),
        json!({"type": "array", "items": {"type": "boolean"}, "minItems": 1}),
        json!({
            "type": "object",
            "required": ["id", "tags"],
            "properties": {
                "id": {"type": "integer", "minimum": 1},
                "tags": {"type": "array", "items": {"type": "string", "enum": ["a", "b"]}},
                "note": {"type": "string"}
            }
        }),
        json!({"allOf": [
            {"type": "object", "required": ["a"], "properties": {"a": {"type": "integer"}}},
            {"type": "object", "required": ["b"], "properties": {"b": {"type": "string"}}}
        ]}),
        json!({"oneOf": [{"type": "null"}, {"type": "string", "format": "uuid"}]}),
    ];
    for schema in &schemas {
        let value = sample::sample(schema);
        assert!(jsonschema::is_valid(schema, &value), "{value} does not satisfy {schema}");
    }
}

#[test]
fn mismatched_values_fail_validation() {
    for schema in [
        json!({"type": "integer"}),
        json!({"type": "string"}),
        json!({"type": "boolean"}),
        json!({"type": "object"}),
    ] {
        let value = sample::mismatched(&schema);
        assert!(!jsonschema::is_valid(&schema, &value));
    }
}
