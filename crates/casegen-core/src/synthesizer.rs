//! Test case synthesis: provider delegation with a deterministic fallback
//!
//! The whole batch goes to the [`Generator`] first. If it is unavailable,
//! every operation is synthesized locally instead, so one response is never
//! a mix of provider-written and fallback-written cases.

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::case::{
    CaseMap, ExpectedResponse, ExpectedResponseSet, MODELED_ERRORS, ParameterSet,
    RequestBodyCases, TestCase, case_id, check_coverage,
};
use crate::error::{GenerationUnavailable, SynthesisFailure};
use crate::generation::Generator;
use crate::model::{Operation, ParamLocation, status_code};
use crate::sample;

/// Which strategy produced a case mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Written by the external provider
    Generated,
    /// Deterministic local rules
    Fallback,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generated => write!(f, "provider"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub cases: CaseMap,
    pub strategy: Strategy,
}

/// Produce one test case per operation.
///
/// The generator is skipped when there are no operations. A generated
/// mapping that fails [`check_coverage`] is discarded as a whole.
///
/// # Errors
///
/// Returns [`SynthesisFailure`] if the fallback mapping does not cover every
/// operation.
pub async fn synthesize_all(
    operations: &[Operation],
    generator: &dyn Generator,
) -> Result<Synthesis, SynthesisFailure> {
    if operations.is_empty() {
        return Ok(Synthesis {
            cases: CaseMap::new(),
            strategy: Strategy::Fallback,
        });
    }

    let generated = generator.generate(operations).await.and_then(|cases| {
        check_coverage(operations, &cases).map_err(GenerationUnavailable::ShapeMismatch)?;
        Ok(cases)
    });
    let (cases, strategy) = match generated {
        Ok(cases) => (cases, Strategy::Generated),
        Err(reason) => {
            warn!(%reason, "generation unavailable, using fallback rules");
            (fallback_cases(operations), Strategy::Fallback)
        }
    };

    check_coverage(operations, &cases).map_err(SynthesisFailure::Incomplete)?;
    debug!(cases = cases.len(), %strategy, "case mapping complete");

    Ok(Synthesis { cases, strategy })
}

/// Deterministic case mapping for every operation.
#[must_use]
pub fn fallback_cases(operations: &[Operation]) -> CaseMap {
    operations
        .iter()
        .enumerate()
        .map(|(index, op)| (case_id(index), synthesize(op)))
        .collect()
}

/// Deterministic test case for one operation.
#[must_use]
pub fn synthesize(op: &Operation) -> TestCase {
    TestCase {
        api_name: op.operation_id.clone(),
        api_summary: if op.summary.is_empty() {
            op.description.clone()
        } else {
            op.summary.clone()
        },
        endpoint: op.path.clone(),
        method: op.method.clone(),
        parameters: parameter_set(op),
        expected_response: expected_responses(op),
        edge_cases: edge_cases(op),
        request_body: op.request_body.as_ref().map(|body| RequestBodyCases {
            content_type: body.content_type.clone(),
            valid: sample::sample(&body.schema),
            invalid: sample::mismatched_body(&body.schema),
        }),
    }
}

/// All four classes for every parameter, optional ones included.
fn parameter_set(op: &Operation) -> ParameterSet {
    let mut set = ParameterSet::default();
    for param in &op.parameters {
        let values = sample::parameter_classes(param);
        set.valid.insert(param.name.clone(), values.valid);
        set.boundary.insert(param.name.clone(), values.boundary);
        set.invalid.insert(param.name.clone(), values.invalid);
        set.null.insert(param.name.clone(), Value::Null);
    }
    set
}

fn expected_responses(op: &Operation) -> ExpectedResponseSet {
    let success_status = op.success_status();
    let success = match op.response(success_status) {
        Some(declared) => ExpectedResponse {
            status_code: success_status,
            description: describe(&declared.description, success_status),
            body: declared.example.clone().unwrap_or_else(|| {
                declared
                    .schema
                    .as_ref()
                    .map(sample::sample)
                    .unwrap_or(Value::Null)
            }),
        },
        None => ExpectedResponse {
            status_code: success_status,
            description: reason_phrase(success_status).to_string(),
            body: Value::Null,
        },
    };

    let mut extra: Vec<u16> = op
        .responses
        .keys()
        .filter_map(|k| status_code(k))
        .filter(|code| *code >= 400 && !MODELED_ERRORS.contains(code))
        .collect();
    extra.sort_unstable();
    extra.dedup();

    let errors: IndexMap<String, ExpectedResponse> = MODELED_ERRORS
        .into_iter()
        .chain(extra)
        .map(|code| (code.to_string(), error_response(op, code)))
        .collect();

    ExpectedResponseSet { success, errors }
}

/// Declared example or schema mock when the document models the status,
/// generic shape otherwise.
fn error_response(op: &Operation, code: u16) -> ExpectedResponse {
    let declared = op.response(code);
    let body = declared
        .and_then(|r| {
            r.example
                .clone()
                .or_else(|| r.schema.as_ref().map(sample::sample))
        })
        .unwrap_or_else(|| json!({"status": code, "error": reason_phrase(code)}));
    ExpectedResponse {
        status_code: code,
        description: declared
            .map(|r| describe(&r.description, code))
            .unwrap_or_else(|| reason_phrase(code).to_string()),
        body,
    }
}

fn describe(declared: &str, code: u16) -> String {
    if declared.is_empty() {
        reason_phrase(code).to_string()
    } else {
        declared.to_string()
    }
}

fn edge_cases(op: &Operation) -> Vec<String> {
    let success = op.success_status();
    let mut cases = vec![format!(
        "Send {} with no parameters at all",
        op.label()
    )];

    let required: Vec<_> = op.parameters.iter().filter(|p| p.required).collect();
    let body_required = op.request_body.as_ref().is_some_and(|b| b.required);
    if required.is_empty() && !body_required {
        cases.push(format!(
            "Omit every field; no required fields are declared, so expect {success}"
        ));
    } else {
        cases.push("Omit every required field and expect 400".to_string());
    }
    for param in &required {
        cases.push(format!(
            "Omit required {} parameter `{}` and expect 400",
            param.location, param.name
        ));
    }
    for param in op.parameters.iter().filter(|p| !p.required) {
        cases.push(format!(
            "Omit optional {} parameter `{}` entirely and expect {success}",
            param.location, param.name
        ));
    }
    for param in op
        .parameters
        .iter()
        .filter(|p| p.location == ParamLocation::Path)
    {
        cases.push(format!(
            "Use a nonexistent `{}` in the path and expect 404",
            param.name
        ));
    }
    if let Some(body) = &op.request_body {
        if body.required {
            cases.push("Send an empty request body and expect 400".to_string());
        }
        cases.push(format!(
            "Send a malformed {} body and expect 400",
            body.content_type
        ));
    }
    cases.push("Call without credentials and expect 401".to_string());
    cases
}

fn reason_phrase(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        200..=299 => "Success",
        400..=499 => "Client Error",
        _ => "Server Error",
    }
}
