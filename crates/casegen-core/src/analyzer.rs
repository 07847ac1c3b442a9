//! OpenAPI spec analysis: extract operations, parameters, bodies and responses
//!
//! Accepts OpenAPI 3.x and Swagger 2.0 documents as `serde_json::Value`.
//! Local `$ref`s are resolved inline; a reference that cannot be found, or
//! one that points back into itself, becomes an untyped `{}` schema. Each
//! schema expands to a bounded number of nodes, so shared references that
//! fan out are cut off instead of inlined without limit.

use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::error::{InvalidSpec, json_type_name};
use crate::model::{
    HTTP_METHODS, Operation, ParamLocation, Parameter, RequestBody, ResponseSpec,
};

/// Maximum nesting of `$ref` chains followed while resolving one schema.
const MAX_REF_DEPTH: usize = 20;

/// Nodes one schema may expand to before further `$ref`s are left unresolved.
const MAX_RESOLVED_NODES: usize = 20_000;

/// Request body media types, in order of preference.
const BODY_CONTENT_TYPES: &[&str] = &[
    "application/json",
    "application/x-www-form-urlencoded",
    "multipart/form-data",
];

/// Keys copied from a Swagger 2.0 parameter into its synthesized schema.
const INLINE_SCHEMA_KEYS: &[&str] = &[
    "type",
    "format",
    "minimum",
    "maximum",
    "minLength",
    "maxLength",
    "enum",
    "items",
    "pattern",
    "default",
];

/// Extract every operation of the document, in discovery order.
///
/// # Errors
///
/// Returns [`InvalidSpec`] when the document is not an object or has no
/// `paths` object.
pub fn analyze(spec: &Value) -> Result<Vec<Operation>, InvalidSpec> {
    let Some(root) = spec.as_object() else {
        return Err(InvalidSpec::NotAnObject(json_type_name(spec)));
    };
    let paths = match root.get("paths") {
        Some(Value::Object(paths)) => paths,
        Some(other) => return Err(InvalidSpec::PathsNotAnObject(json_type_name(other))),
        None => return Err(InvalidSpec::MissingPaths),
    };

    let refs = RefResolver { root: spec };
    let mut ops = Vec::new();

    for (path, path_item) in paths {
        let Some(item) = path_item.as_object() else {
            continue;
        };
        let shared_params = item.get("parameters");
        let mut seen: Vec<String> = Vec::new();

        for (key, operation) in item {
            let method = key.to_ascii_lowercase();
            if !HTTP_METHODS.contains(&method.as_str()) {
                continue;
            }
            if seen.contains(&method) {
                warn!(path = %path, method = %key, "duplicate method key, keeping the first");
                continue;
            }
            seen.push(method.clone());
            let Some(operation) = operation.as_object() else {
                continue;
            };
            ops.push(build_operation(
                path,
                &method,
                operation,
                shared_params,
                &refs,
            ));
        }
    }

    Ok(ops)
}

fn build_operation(
    path: &str,
    method: &str,
    operation: &Map<String, Value>,
    shared_params: Option<&Value>,
    refs: &RefResolver<'_>,
) -> Operation {
    let text = |key: &str| {
        operation
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let (parameters, body_param) =
        collect_parameters(shared_params, operation.get("parameters"), refs);

    let operation_id = match operation.get("operationId").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("{method}_{}", path.replace('/', "_")),
    };

    Operation {
        path: path.to_string(),
        method: method.to_uppercase(),
        operation_id,
        summary: text("summary"),
        description: text("description"),
        tags: operation
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        parameters,
        request_body: extract_request_body(operation, refs).or(body_param),
        responses: extract_responses(operation, refs),
    }
}

/// Merge path-level and operation-level parameters.
///
/// An operation-level parameter replaces the path-level one with the same
/// (name, location) in place. A Swagger 2.0 `in: body` parameter is returned
/// separately as the request body.
fn collect_parameters(
    shared: Option<&Value>,
    own: Option<&Value>,
    refs: &RefResolver<'_>,
) -> (Vec<Parameter>, Option<RequestBody>) {
    let mut merged: Vec<Parameter> = Vec::new();
    let mut body = None;

    for source in [shared, own].into_iter().flatten() {
        let Some(list) = source.as_array() else {
            continue;
        };
        for raw in list {
            let Some(raw) = refs.deref(raw) else {
                continue;
            };
            if raw.get("in").and_then(Value::as_str) == Some("body") {
                body = Some(RequestBody {
                    content_type: "application/json".into(),
                    required: raw.get("required").and_then(Value::as_bool).unwrap_or(false),
                    schema: raw
                        .get("schema")
                        .map(|s| refs.resolve(s))
                        .unwrap_or_else(|| json!({})),
                });
                continue;
            }
            let Some(param) = parse_parameter(raw, refs) else {
                continue;
            };
            match merged
                .iter_mut()
                .find(|p| p.name == param.name && p.location == param.location)
            {
                Some(existing) => *existing = param,
                None => merged.push(param),
            }
        }
    }

    (merged, body)
}

fn parse_parameter(raw: &Value, refs: &RefResolver<'_>) -> Option<Parameter> {
    let name = raw.get("name")?.as_str()?;
    let location = ParamLocation::parse(raw.get("in")?.as_str()?)?;

    let schema = match raw.get("schema") {
        Some(schema) => refs.resolve(schema),
        // Swagger 2.0: type information lives on the parameter itself
        None => {
            let inline: Map<String, Value> = INLINE_SCHEMA_KEYS
                .iter()
                .filter_map(|key| raw.get(*key).map(|v| ((*key).to_string(), refs.resolve(v))))
                .collect();
            Value::Object(inline)
        }
    };

    let required = location == ParamLocation::Path
        || raw.get("required").and_then(Value::as_bool).unwrap_or(false);

    let mut param = Parameter::from_schema(name, location, required, schema);
    if let Some(example) = raw.get("example") {
        param.example = Some(example.clone());
    }
    param.description = raw
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(param)
}

fn extract_request_body(
    operation: &Map<String, Value>,
    refs: &RefResolver<'_>,
) -> Option<RequestBody> {
    let body = refs.deref(operation.get("requestBody")?)?;
    let content = body.get("content")?.as_object()?;

    BODY_CONTENT_TYPES.iter().find_map(|content_type| {
        content.get(*content_type).map(|media| RequestBody {
            content_type: (*content_type).to_string(),
            required: body.get("required").and_then(Value::as_bool).unwrap_or(false),
            schema: media
                .get("schema")
                .map(|s| refs.resolve(s))
                .unwrap_or_else(|| json!({})),
        })
    })
}

fn extract_responses(
    operation: &Map<String, Value>,
    refs: &RefResolver<'_>,
) -> IndexMap<String, ResponseSpec> {
    let mut responses = IndexMap::new();
    let Some(declared) = operation.get("responses").and_then(Value::as_object) else {
        return responses;
    };

    for (status, raw) in declared {
        let Some(raw) = refs.deref(raw) else {
            continue;
        };
        let description = raw
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let (content_type, schema, example) = match raw.get("content").and_then(Value::as_object) {
            Some(content) => {
                // Prefer application/json, otherwise the first declared media type
                let media = content
                    .get_key_value("application/json")
                    .or_else(|| content.iter().next());
                match media {
                    Some((ct, media)) => (
                        Some(ct.clone()),
                        media.get("schema").map(|s| refs.resolve(s)),
                        media.get("example").filter(|e| !e.is_null()).cloned(),
                    ),
                    None => (None, None, None),
                }
            }
            // Swagger 2.0: schema sits directly on the response
            None => (
                None,
                raw.get("schema").map(|s| refs.resolve(s)),
                raw.pointer("/examples/application~1json").cloned(),
            ),
        };

        responses.insert(
            status.clone(),
            ResponseSpec {
                description,
                content_type,
                schema,
                example,
            },
        );
    }

    responses
}

/// Resolves local `#/...` references against the document root.
struct RefResolver<'a> {
    root: &'a Value,
}

impl<'a> RefResolver<'a> {
    fn lookup(&self, reference: &str) -> Option<&'a Value> {
        reference
            .strip_prefix('#')
            .and_then(|pointer| self.root.pointer(pointer))
    }

    /// Follow a single `$ref` on a parameter, body or response object.
    fn deref<'v>(&self, value: &'v Value) -> Option<&'v Value>
    where
        'a: 'v,
    {
        match value.get("$ref").and_then(Value::as_str) {
            Some(reference) => self.lookup(reference),
            None => Some(value),
        }
    }

    /// Produce a self-contained copy of `schema` with every `$ref` inlined.
    ///
    /// Cyclic, too deep, or over-budget references become `{}`.
    fn resolve(&self, schema: &Value) -> Value {
        let mut expansion = Expansion {
            stack: Vec::new(),
            remaining: MAX_RESOLVED_NODES,
        };
        self.resolve_inner(schema, &mut expansion)
    }

    fn resolve_inner(&self, schema: &Value, expansion: &mut Expansion) -> Value {
        expansion.remaining = expansion.remaining.saturating_sub(1);
        match schema {
            Value::Object(obj) => {
                if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
                    if expansion.remaining == 0
                        || expansion.stack.len() >= MAX_REF_DEPTH
                        || expansion.stack.iter().any(|r| r == reference)
                    {
                        return json!({});
                    }
                    let Some(target) = self.lookup(reference) else {
                        return json!({});
                    };
                    expansion.stack.push(reference.to_string());
                    let resolved = self.resolve_inner(target, expansion);
                    expansion.stack.pop();
                    return resolved;
                }
                Value::Object(
                    obj.iter()
                        .map(|(k, v)| (k.clone(), self.resolve_inner(v, expansion)))
                        .collect(),
                )
            }
            Value::Array(arr) => Value::Array(
                arr.iter()
                    .map(|v| self.resolve_inner(v, expansion))
                    .collect(),
            ),
            _ => schema.clone(),
        }
    }
}

/// Inlining state for one schema: the refs being expanded and the node
/// budget left.
struct Expansion {
    stack: Vec<String>,
    remaining: usize,
}
