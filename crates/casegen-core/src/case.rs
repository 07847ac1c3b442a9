//! Test case and envelope types: the wire format returned to callers
//!
//! The same shapes are requested from the LLM provider, so a provider reply
//! deserializes straight into a [`CaseMap`].

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Operation;

/// Case id → test case, in operation discovery order.
pub type CaseMap = IndexMap<String, TestCase>;

/// Synthetic id of the case for the operation at `index` ("testcase1", …).
#[must_use]
pub fn case_id(index: usize) -> String {
    format!("testcase{}", index + 1)
}

/// Generated test scenario for one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestCase {
    /// Operation id
    pub api_name: String,
    #[serde(default)]
    pub api_summary: String,
    /// Path template
    pub endpoint: String,
    /// Uppercase HTTP method
    pub method: String,
    pub parameters: ParameterSet,
    pub expected_response: ExpectedResponseSet,
    /// Free-text edge-case scenarios
    #[serde(default)]
    pub edge_cases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyCases>,
}

/// Error statuses every test case models, declared or not.
pub const MODELED_ERRORS: [u16; 4] = [400, 401, 404, 500];

/// Parameter name → value for each of the four parameter classes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParameterSet {
    pub valid: IndexMap<String, Value>,
    pub boundary: IndexMap<String, Value>,
    pub invalid: IndexMap<String, Value>,
    pub null: IndexMap<String, Value>,
}

impl ParameterSet {
    fn classes(&self) -> [(&'static str, &IndexMap<String, Value>); 4] {
        [
            ("valid", &self.valid),
            ("boundary", &self.boundary),
            ("invalid", &self.invalid),
            ("null", &self.null),
        ]
    }
}

/// Success entry plus one entry per modeled error status, keyed by the code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExpectedResponseSet {
    pub success: ExpectedResponse,
    #[serde(flatten)]
    pub errors: IndexMap<String, ExpectedResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExpectedResponse {
    pub status_code: u16,
    #[serde(default)]
    pub description: String,
    /// Mock payload
    #[serde(default)]
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RequestBodyCases {
    pub content_type: String,
    pub valid: Value,
    pub invalid: Value,
}

/// Top-level response returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResultEnvelope {
    pub status: EnvelopeStatus,
    pub message: String,
    #[serde(default)]
    pub test_cases: CaseMap,
}

impl ResultEnvelope {
    #[must_use]
    pub fn success(message: impl Into<String>, test_cases: CaseMap) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            message: message.into(),
            test_cases,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            message: message.into(),
            test_cases: CaseMap::new(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

impl std::fmt::Display for EnvelopeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Check that `cases` holds exactly one case per operation, keyed
/// `testcase1..N` in order, each naming its operation's endpoint and method.
///
/// Each case must also model every status in [`MODELED_ERRORS`] and carry
/// every required parameter of its operation in all four classes.
///
/// # Errors
///
/// Returns a description of the first mismatch.
pub fn check_coverage(operations: &[Operation], cases: &CaseMap) -> Result<(), String> {
    if cases.len() != operations.len() {
        return Err(format!(
            "expected {} cases, found {}",
            operations.len(),
            cases.len()
        ));
    }
    for (index, (op, (key, case))) in operations.iter().zip(cases).enumerate() {
        let expected = case_id(index);
        if *key != expected {
            return Err(format!("expected key {expected}, found {key}"));
        }
        if case.endpoint != op.path || !case.method.eq_ignore_ascii_case(&op.method) {
            return Err(format!(
                "{key} describes {} {}, expected {}",
                case.method,
                case.endpoint,
                op.label()
            ));
        }
        check_case_shape(key, op, case)?;
    }
    Ok(())
}

fn check_case_shape(key: &str, op: &Operation, case: &TestCase) -> Result<(), String> {
    if let Some(code) = MODELED_ERRORS
        .iter()
        .map(u16::to_string)
        .find(|code| !case.expected_response.errors.contains_key(code))
    {
        return Err(format!("{key} has no expected response for {code}"));
    }
    for param in op.parameters.iter().filter(|p| p.required) {
        for (class, values) in case.parameters.classes() {
            if !values.contains_key(&param.name) {
                return Err(format!(
                    "{key} is missing required parameter `{}` in the {class} class",
                    param.name
                ));
            }
        }
    }
    Ok(())
}

/// Generate JSON Schema for the envelope format.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(ResultEnvelope);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ParamLocation, Parameter};
    use serde_json::json;

    fn expected(status_code: u16) -> ExpectedResponse {
        ExpectedResponse {
            status_code,
            description: String::new(),
            body: json!({"status": status_code}),
        }
    }

    fn case(endpoint: &str, method: &str) -> TestCase {
        TestCase {
            api_name: "op".into(),
            api_summary: String::new(),
            endpoint: endpoint.into(),
            method: method.into(),
            parameters: ParameterSet::default(),
            expected_response: ExpectedResponseSet {
                success: expected(200),
                errors: MODELED_ERRORS
                    .into_iter()
                    .map(|code| (code.to_string(), expected(code)))
                    .collect(),
            },
            edge_cases: vec!["no parameters".into()],
            request_body: None,
        }
    }

    fn op(path: &str, method: &str) -> Operation {
        Operation {
            path: path.into(),
            method: method.into(),
            operation_id: "op".into(),
            summary: String::new(),
            description: String::new(),
            tags: vec![],
            parameters: vec![],
            request_body: None,
            responses: IndexMap::new(),
        }
    }

    #[test]
    fn case_ids_are_one_based() {
        assert_eq!(case_id(0), "testcase1");
        assert_eq!(case_id(9), "testcase10");
    }

    #[test]
    fn expected_response_set_flattens_error_codes() {
        let v = serde_json::to_value(case("/pets", "GET").expected_response).unwrap();
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["success", "400", "401", "404", "500"]);
        assert_eq!(v["400"]["status_code"], 400);
    }

    #[test]
    fn envelope_round_trip_preserves_order() {
        let mut cases = CaseMap::new();
        cases.insert("testcase1".into(), case("/b", "POST"));
        cases.insert("testcase2".into(), case("/a", "GET"));
        let envelope = ResultEnvelope::success("Generated test cases for 2 endpoints", cases);

        let text = serde_json::to_string(&envelope).unwrap();
        let back: ResultEnvelope = serde_json::from_str(&text).unwrap();
        assert_eq!(back, envelope);
        let keys: Vec<&String> = back.test_cases.keys().collect();
        assert_eq!(keys, ["testcase1", "testcase2"]);
    }

    #[test]
    fn envelope_status_serializes_lowercase() {
        let v = serde_json::to_value(ResultEnvelope::error("bad")).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["message"], "bad");
        assert_eq!(v["test_cases"], json!({}));
    }

    #[test]
    fn parameter_set_requires_every_class() {
        let partial = serde_json::from_value::<ParameterSet>(json!({"valid": {"id": 1}}));
        assert!(partial.is_err());

        let set: ParameterSet = serde_json::from_value(json!({
            "valid": {"id": 1}, "boundary": {}, "invalid": {}, "null": {}
        }))
        .unwrap();
        assert_eq!(set.valid["id"], 1);
        assert!(set.null.is_empty());
    }

    #[test]
    fn coverage_accepts_matching_map() {
        let ops = vec![op("/a", "GET"), op("/a", "POST")];
        let mut cases = CaseMap::new();
        cases.insert("testcase1".into(), case("/a", "get"));
        cases.insert("testcase2".into(), case("/a", "POST"));
        assert!(check_coverage(&ops, &cases).is_ok());
    }

    #[test]
    fn coverage_rejects_partial_or_misordered_maps() {
        let ops = vec![op("/a", "GET"), op("/b", "GET")];

        let mut partial = CaseMap::new();
        partial.insert("testcase1".into(), case("/a", "GET"));
        assert!(check_coverage(&ops, &partial).unwrap_err().contains("expected 2 cases"));

        let mut swapped = CaseMap::new();
        swapped.insert("testcase1".into(), case("/b", "GET"));
        swapped.insert("testcase2".into(), case("/a", "GET"));
        assert!(check_coverage(&ops, &swapped).is_err());

        let mut renamed = CaseMap::new();
        renamed.insert("case_a".into(), case("/a", "GET"));
        renamed.insert("case_b".into(), case("/b", "GET"));
        assert!(check_coverage(&ops, &renamed).unwrap_err().contains("testcase1"));
    }

    #[test]
    fn coverage_rejects_missing_error_codes() {
        let ops = vec![op("/a", "GET")];
        let mut thin = case("/a", "GET");
        thin.expected_response.errors.shift_remove("404");
        let cases: CaseMap = [("testcase1".to_string(), thin)].into_iter().collect();
        assert_eq!(
            check_coverage(&ops, &cases).unwrap_err(),
            "testcase1 has no expected response for 404"
        );
    }

    #[test]
    fn coverage_rejects_missing_required_parameters() {
        let mut with_id = op("/a/{id}", "GET");
        with_id.parameters.push(Parameter::from_schema(
            "id",
            ParamLocation::Path,
            true,
            json!({"type": "integer"}),
        ));
        let ops = vec![with_id];

        let mut filled = case("/a/{id}", "GET");
        for class in [
            &mut filled.parameters.valid,
            &mut filled.parameters.boundary,
            &mut filled.parameters.invalid,
            &mut filled.parameters.null,
        ] {
            class.insert("id".into(), json!(1));
        }
        let mut cases: CaseMap = [("testcase1".to_string(), filled)].into_iter().collect();
        assert!(check_coverage(&ops, &cases).is_ok());

        cases["testcase1"].parameters.boundary.clear();
        assert!(
            check_coverage(&ops, &cases)
                .unwrap_err()
                .contains("`id` in the boundary class")
        );
    }

    #[test]
    fn schema_generation_produces_valid_json() {
        let schema = generate_schema();
        let parsed: serde_json::Value = serde_json::from_str(&schema).unwrap();
        assert_eq!(
            parsed.get("title").and_then(|v| v.as_str()),
            Some("ResultEnvelope")
        );
    }
}
