//! Deterministic JSON Schema → sample value generation
//!
//! Handles the OpenAPI 3.x / JSON Schema subset seen in parameters and
//! response bodies: string, integer, number, boolean, array, object, enum,
//! anyOf, oneOf, allOf. Schemas arrive with `$ref` already inlined by the
//! analyzer. No randomness: the same schema always yields the same value.

use serde_json::{Map, Value, json};

use crate::model::{ParamType, Parameter};

/// Maximum recursion depth for schema traversal.
const MAX_DEPTH: u32 = 20;

/// Maximum string length for boundary values (prevents OOM on absurd maxLength values).
pub const MAX_STRING_LEN: usize = 10_000;

/// Representative value for an untyped schema or parameter.
const PLACEHOLDER: &str = "placeholder";

/// Minimal-shape value conforming to the given schema.
#[must_use]
pub fn sample(schema: &Value) -> Value {
    sample_inner(schema, 0)
}

fn sample_inner(schema: &Value, depth: u32) -> Value {
    if depth > MAX_DEPTH {
        return Value::Null;
    }

    if let Some(example) = schema.get("example") {
        return example.clone();
    }
    if let Some(first) = schema
        .get("examples")
        .and_then(Value::as_array)
        .and_then(|e| e.first())
    {
        return first.clone();
    }

    if let Some(first) = schema
        .get("enum")
        .and_then(Value::as_array)
        .and_then(|e| e.first())
    {
        return first.clone();
    }

    // anyOf / oneOf: first non-null variant
    for key in ["anyOf", "oneOf"] {
        if let Some(variants) = schema.get(key).and_then(Value::as_array) {
            return variants
                .iter()
                .find(|s| s.get("type").and_then(Value::as_str) != Some("null"))
                .map(|s| sample_inner(s, depth + 1))
                .unwrap_or(Value::Null);
        }
    }

    // allOf: merge objects
    if let Some(all_of) = schema.get("allOf").and_then(Value::as_array) {
        let mut merged = Map::new();
        for sub in all_of {
            if let Value::Object(obj) = sample_inner(sub, depth + 1) {
                merged.extend(obj);
            }
        }
        return Value::Object(merged);
    }

    match ParamType::of(schema) {
        ParamType::String => sample_string(schema),
        ParamType::Integer => sample_integer(schema),
        ParamType::Number => sample_number(schema),
        ParamType::Boolean => Value::Bool(true),
        ParamType::Array => sample_array(schema, depth + 1),
        ParamType::Object => sample_object(schema, depth + 1),
        ParamType::Unknown if schema.get("type").and_then(Value::as_str) == Some("null") => {
            Value::Null
        }
        ParamType::Unknown => Value::String(PLACEHOLDER.into()),
    }
}

fn sample_string(schema: &Value) -> Value {
    let by_format = match schema.get("format").and_then(Value::as_str) {
        Some("email") => Some("user@example.com"),
        Some("uri" | "url") => Some("https://example.com"),
        Some("hostname") => Some("example.com"),
        Some("ipv4") => Some("192.0.2.1"),
        Some("ipv6") => Some("2001:db8::1"),
        Some("date") => Some("2024-01-15"),
        Some("date-time") => Some("2024-01-15T12:00:00Z"),
        Some("time") => Some("12:00:00"),
        Some("uuid") => Some("550e8400-e29b-41d4-a716-446655440000"),
        Some("byte") => Some("ZXhhbXBsZQ=="),
        Some("password") => Some("P@ssw0rd123"),
        _ => None,
    };
    if let Some(s) = by_format {
        return Value::String(s.into());
    }

    let min = schema
        .get("minLength")
        .and_then(Value::as_u64)
        .map(cap_len)
        .unwrap_or(0);
    let max = schema.get("maxLength").and_then(Value::as_u64).map(cap_len);

    let mut s = String::from("example");
    if s.len() < min {
        s.push_str(&"a".repeat(min - s.len()));
    }
    if let Some(max) = max {
        s.truncate(max.max(min));
    }
    Value::String(s)
}

/// 1, clamped into the declared range.
fn sample_integer(schema: &Value) -> Value {
    let mut v: i64 = 1;
    if let Some(min) = schema.get("minimum").and_then(Value::as_i64) {
        v = v.max(min);
    }
    if let Some(max) = schema.get("maximum").and_then(Value::as_i64) {
        v = v.min(max);
    }
    json!(v)
}

fn sample_number(schema: &Value) -> Value {
    let mut v: f64 = 1.0;
    if let Some(min) = schema.get("minimum").and_then(Value::as_f64) {
        v = v.max(min);
    }
    if let Some(max) = schema.get("maximum").and_then(Value::as_f64) {
        v = v.min(max);
    }
    json!(v)
}

fn sample_array(schema: &Value, depth: u32) -> Value {
    if schema.get("maxItems").and_then(Value::as_u64) == Some(0) {
        return json!([]);
    }
    let item = schema
        .get("items")
        .map(|items| sample_inner(items, depth))
        .unwrap_or_else(|| Value::String(PLACEHOLDER.into()));
    Value::Array(vec![item])
}

/// Required properties only; every property when `required` is absent.
fn sample_object(schema: &Value, depth: u32) -> Value {
    let required: Option<Vec<&str>> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect());

    let mut obj = Map::new();
    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        for (key, prop_schema) in props {
            if required
                .as_ref()
                .is_none_or(|names| names.contains(&key.as_str()))
            {
                obj.insert(key.clone(), sample_inner(prop_schema, depth));
            }
        }
    }
    Value::Object(obj)
}

/// A value of a JSON type the schema does not accept.
#[must_use]
pub fn mismatched(schema: &Value) -> Value {
    match ParamType::of(schema) {
        ParamType::Integer | ParamType::Number => json!("not-a-number"),
        ParamType::Boolean => json!("not-a-boolean"),
        ParamType::Array => json!("not-an-array"),
        ParamType::Object => json!("not-an-object"),
        ParamType::String | ParamType::Unknown => json!(12345),
    }
}

/// Invalid request body: every sampled property replaced by a mismatched type.
///
/// Non-object schemas are replaced wholesale.
#[must_use]
pub fn mismatched_body(schema: &Value) -> Value {
    let Some(props) = schema.get("properties").and_then(Value::as_object) else {
        return mismatched(schema);
    };
    match sample(schema) {
        Value::Object(valid) => Value::Object(
            valid
                .keys()
                .map(|key| {
                    let value = props.get(key).map(mismatched).unwrap_or(Value::Null);
                    (key.clone(), value)
                })
                .collect(),
        ),
        _ => mismatched(schema),
    }
}

/// Values for one parameter in the valid, boundary and invalid classes.
///
/// The null class is always an explicit `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassValues {
    pub valid: Value,
    pub boundary: Value,
    pub invalid: Value,
}

#[must_use]
pub fn parameter_classes(param: &Parameter) -> ClassValues {
    let valid = param
        .example
        .clone()
        .unwrap_or_else(|| sample(&param.schema));

    let boundary = match param.param_type {
        ParamType::Integer => integer_boundary(param),
        ParamType::Number => number_boundary(param),
        ParamType::Boolean => json!(false),
        ParamType::Array => json!([]),
        ParamType::Object => json!({}),
        ParamType::String | ParamType::Unknown => string_boundary(param),
    };

    ClassValues {
        valid,
        boundary,
        invalid: mismatched(&param.schema),
    }
}

/// Declared maximum, else the largest value of the declared width.
fn integer_boundary(param: &Parameter) -> Value {
    if let Some(max) = &param.bounds.maximum {
        return Value::Number(max.clone());
    }
    match param.format.as_deref() {
        Some("int64") => json!(i64::MAX),
        _ => json!(i32::MAX),
    }
}

fn number_boundary(param: &Parameter) -> Value {
    if let Some(max) = &param.bounds.maximum {
        return Value::Number(max.clone());
    }
    match param.format.as_deref() {
        Some("float") => json!(f64::from(f32::MAX)),
        _ => json!(f64::MAX),
    }
}

/// A `maxLength`-long string, or the empty string when unbounded.
fn string_boundary(param: &Parameter) -> Value {
    match param.bounds.max_length {
        Some(max) => Value::String("a".repeat(cap_len(max))),
        None => Value::String(String::new()),
    }
}

fn cap_len(len: u64) -> usize {
    usize::try_from(len).unwrap_or(MAX_STRING_LEN).min(MAX_STRING_LEN)
}
