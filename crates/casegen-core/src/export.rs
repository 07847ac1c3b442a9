//! HTTP file export - renders a case mapping as `.http` requests
//!
//! One request per parameter class, so the file can be replayed directly in
//! an editor REST client against a running server.

use indexmap::IndexMap;
use serde_json::Value;

use crate::case::{CaseMap, TestCase};
use crate::model::{Operation, ParamLocation};

const CLASSES: [&str; 4] = ["valid", "boundary", "invalid", "null"];

/// Generate .http file content for every case.
///
/// `operations` supplies parameter locations; cases are paired with
/// operations by position.
#[must_use]
pub fn to_http_file(operations: &[Operation], cases: &CaseMap, base_url_var: &str) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "# Auto-generated test requests ({} cases)",
        cases.len()
    ));
    lines.push(format!("# Base URL variable: {{{{{base_url_var}}}}}"));
    lines.push(String::new());

    for (op, (id, case)) in operations.iter().zip(cases) {
        for class in CLASSES {
            let values = class_values(case, class);
            lines.push(format!("### {id} [{class}] {} {}", case.method, case.endpoint));
            if !case.api_summary.is_empty() {
                lines.push(format!("# {}", case.api_summary));
            }

            lines.push(format!(
                "{} {{{{{base_url_var}}}}}{}",
                case.method,
                request_target(op, &case.endpoint, values)
            ));

            for param in op
                .parameters
                .iter()
                .filter(|p| p.location == ParamLocation::Header)
            {
                if let Some(value) = values.get(&param.name).filter(|v| !v.is_null()) {
                    lines.push(format!("{}: {}", param.name, render(value)));
                }
            }

            if let Some(body) = class_body(case, class) {
                let content_type = case
                    .request_body
                    .as_ref()
                    .map_or("application/json", |b| b.content_type.as_str());
                lines.push(format!("Content-Type: {content_type}"));
                lines.push(String::new());
                lines.push(body.to_string());
            }

            lines.push(String::new());
        }
    }

    lines.join("\n")
}

fn class_values<'a>(case: &'a TestCase, class: &str) -> &'a IndexMap<String, Value> {
    let p = &case.parameters;
    match class {
        "boundary" => &p.boundary,
        "invalid" => &p.invalid,
        "null" => &p.null,
        _ => &p.valid,
    }
}

/// Body sent with a class: invalid gets the mismatched payload, null none.
fn class_body<'a>(case: &'a TestCase, class: &str) -> Option<&'a Value> {
    let body = case.request_body.as_ref()?;
    match class {
        "null" => None,
        "invalid" => Some(&body.invalid),
        _ => Some(&body.valid),
    }
}

/// Path with parameters substituted plus the query string.
fn request_target(op: &Operation, endpoint: &str, values: &IndexMap<String, Value>) -> String {
    let mut path = endpoint.to_string();
    let mut query = Vec::new();

    for param in &op.parameters {
        let Some(value) = values.get(&param.name) else {
            continue;
        };
        match param.location {
            ParamLocation::Path => {
                path = path.replace(&format!("{{{}}}", param.name), &render(value));
            }
            ParamLocation::Query if !value.is_null() => {
                query.push(format!("{}={}", param.name, render(value)));
            }
            _ => {}
        }
    }

    if query.is_empty() {
        path
    } else {
        format!("{path}?{}", query.join("&"))
    }
}

/// Strings unquoted, null empty, everything else as JSON text.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::synthesizer::fallback_cases;
    use serde_json::json;

    fn export(spec: Value) -> String {
        let ops = analyze(&spec).unwrap();
        to_http_file(&ops, &fallback_cases(&ops), "base_url")
    }

    fn spec() -> Value {
        json!({"paths": {"/pets/{petId}": {"put": {
            "summary": "Update a pet",
            "parameters": [
                {"name": "petId", "in": "path", "schema": {"type": "integer"}},
                {"name": "dryRun", "in": "query", "schema": {"type": "boolean"}},
                {"name": "X-Trace", "in": "header", "schema": {"type": "string", "example": "t-1"}}
            ],
            "requestBody": {"content": {"application/json": {"schema": {
                "type": "object", "required": ["name"], "properties": {"name": {"type": "string"}}
            }}}}
        }}}})
    }

    #[test]
    fn generates_http_file_header() {
        let output = export(spec());
        assert!(output.contains("# Auto-generated test requests (1 cases)"));
        assert!(output.contains("{{base_url}}"));
    }

    #[test]
    fn one_request_per_class() {
        let output = export(spec());
        for class in CLASSES {
            assert!(output.contains(&format!("### testcase1 [{class}] PUT /pets/{{petId}}")));
        }
        assert!(output.contains("# Update a pet"));
    }

    #[test]
    fn substitutes_path_and_query_parameters() {
        let output = export(spec());
        assert!(output.contains("PUT {{base_url}}/pets/1?dryRun=true"));
        assert!(output.contains("PUT {{base_url}}/pets/2147483647?dryRun=false"));
        assert!(output.contains("PUT {{base_url}}/pets/not-a-number?dryRun=not-a-boolean"));
    }

    #[test]
    fn null_class_drops_query_and_body() {
        let output = export(spec());
        let null_block = output.split("[null]").nth(1).unwrap();
        assert!(null_block.contains("PUT {{base_url}}/pets/\n"));
        assert!(!null_block.contains("Content-Type"));
    }

    #[test]
    fn includes_headers_and_bodies() {
        let output = export(spec());
        assert!(output.contains("X-Trace: t-1"));
        assert!(output.contains("Content-Type: application/json"));
        assert!(output.contains(r#"{"name":"example"}"#));
        assert!(output.contains(r#"{"name":12345}"#));
    }
}
