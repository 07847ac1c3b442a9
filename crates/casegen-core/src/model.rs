//! Normalized operations extracted from an OpenAPI document

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// HTTP verbs recognized as operations under a path item.
pub const HTTP_METHODS: &[&str] = &["get", "post", "put", "patch", "delete", "head", "options"];

/// One (path, method) pair with everything needed to derive its test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Path template, e.g. "/pets/{petId}"
    pub path: String,
    /// Uppercase HTTP method
    pub method: String,
    /// `operationId`, or `{method}_{path}` when the document omits it
    pub operation_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Path-level and operation-level parameters, merged
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status as written in the document ("200", "404", "default")
    #[serde(default)]
    pub responses: IndexMap<String, ResponseSpec>,
}

impl Operation {
    /// Label used in logs, e.g. "GET /pets".
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Lowest declared 2xx status, or 200 when none is declared.
    #[must_use]
    pub fn success_status(&self) -> u16 {
        self.responses
            .keys()
            .filter_map(|k| status_code(k))
            .filter(|code| (200..300).contains(code))
            .min()
            .unwrap_or(200)
    }

    /// Declared response for a numeric status, if any.
    #[must_use]
    pub fn response(&self, status: u16) -> Option<&ResponseSpec> {
        self.responses.get(&status.to_string())
    }
}

/// Parse a response key into a numeric status ("2XX" and "default" yield `None`).
#[must_use]
pub fn status_code(key: &str) -> Option<u16> {
    key.parse().ok().filter(|code| (100..600).contains(code))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub location: ParamLocation,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub required: bool,
    /// Format hint, e.g. "int32", "email"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Bounds::is_empty")]
    pub bounds: Bounds,
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Resolved schema the typed fields were read from
    #[serde(default)]
    pub schema: Value,
}

impl Parameter {
    /// Build a parameter from its resolved schema.
    #[must_use]
    pub fn from_schema(name: &str, location: ParamLocation, required: bool, schema: Value) -> Self {
        Self {
            name: name.to_string(),
            location,
            param_type: ParamType::of(&schema),
            required,
            format: schema
                .get("format")
                .and_then(Value::as_str)
                .map(String::from),
            bounds: Bounds::of(&schema),
            enum_values: schema
                .get("enum")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            example: schema.get("example").cloned(),
            description: String::new(),
            schema,
        }
    }
}

/// Where a parameter travels. Cookie parameters are not modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
}

impl ParamLocation {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            _ => None,
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Header => write!(f, "header"),
        }
    }
}

/// Declared JSON type of a parameter or schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Integer,
    Number,
    String,
    Boolean,
    Array,
    Object,
    Unknown,
}

impl ParamType {
    /// Read the type of a resolved schema.
    ///
    /// OpenAPI 3.1 type arrays (`["string", "null"]`) use their first non-null
    /// member. Untyped schemas are inferred from `properties`/`items`.
    #[must_use]
    pub fn of(schema: &Value) -> Self {
        let declared = match schema.get("type") {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(Value::Array(types)) => types
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null"),
            _ => None,
        };
        match declared {
            Some("integer") => Self::Integer,
            Some("number") => Self::Number,
            Some("string") => Self::String,
            Some("boolean") => Self::Boolean,
            Some("array") => Self::Array,
            Some("object") => Self::Object,
            Some(_) => Self::Unknown,
            None if schema.get("properties").is_some() => Self::Object,
            None if schema.get("items").is_some() => Self::Array,
            None => Self::Unknown,
        }
    }
}

/// Numeric and length bounds declared on a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
}

impl Bounds {
    #[must_use]
    pub fn of(schema: &Value) -> Self {
        let number = |key: &str| match schema.get(key) {
            Some(Value::Number(n)) => Some(n.clone()),
            _ => None,
        };
        Self {
            minimum: number("minimum"),
            maximum: number("maximum"),
            min_length: schema.get("minLength").and_then(Value::as_u64),
            max_length: schema.get("maxLength").and_then(Value::as_u64),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.minimum.is_none()
            && self.maximum.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub content_type: String,
    pub required: bool,
    pub schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Example payload declared on the media object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}
