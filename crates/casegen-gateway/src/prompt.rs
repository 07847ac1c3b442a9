//! Prompt construction

use casegen_core::{Operation, case_id};

const INSTRUCTIONS: &str = r#"You are an expert QA automation engineer specializing in API testing.
Generate one structured test case for every API operation listed below.

Return a single JSON object and nothing else: no markdown fences, no prose.
The object must have exactly one key per operation, named "testcase1",
"testcase2", ... in the order the operations are listed. Each value must
follow this shape:

{
  "api_name": "operation id",
  "api_summary": "one-sentence summary",
  "endpoint": "path template exactly as listed, e.g. /users/{id}",
  "method": "HTTP method in uppercase, exactly as listed",
  "parameters": {
    "valid":    { "<param>": <in-range representative value> },
    "boundary": { "<param>": <declared maximum / max-length value, or a large sentinel> },
    "invalid":  { "<param>": <value of the wrong JSON type> },
    "null":     { "<param>": null }
  },
  "expected_response": {
    "success": { "status_code": <lowest declared 2xx, default 200>, "description": "...", "body": <mock payload> },
    "400": { "status_code": 400, "description": "...", "body": <mock payload> },
    "401": { "status_code": 401, "description": "...", "body": <mock payload> },
    "404": { "status_code": 404, "description": "...", "body": <mock payload> },
    "500": { "status_code": 500, "description": "...", "body": <mock payload> }
  },
  "edge_cases": ["free-text scenario", "..."],
  "request_body": { "content_type": "...", "valid": <payload>, "invalid": <payload> }
}

Rules:
- Every parameter appears in all four parameter classes; use {} when there are none.
- Mock payloads must conform to the declared response schema when one exists;
  otherwise use {"status": <code>, "error": "<reason>"}.
- edge_cases must cover: no parameters at all, each missing required field,
  each optional parameter omitted, and requests without credentials.
- Omit "request_body" when the operation has no request body.
"#;

/// Full prompt for a batch of operations.
///
/// # Errors
///
/// Returns an error if the operations cannot be serialized.
pub fn build_prompt(operations: &[Operation]) -> Result<String, serde_json::Error> {
    let listing = serde_json::to_string_pretty(operations)?;
    let keys = (0..operations.len())
        .map(case_id)
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "{INSTRUCTIONS}\nExpected keys: {keys}\n\nOperations ({}):\n{listing}\n",
        operations.len()
    ))
}

/// Connectivity check prompt.
pub const PING_PROMPT: &str = r#"Reply with exactly this JSON object: {"status": "ok"}"#;
