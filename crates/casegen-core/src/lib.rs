//! casegen-core: OpenAPI analysis and test case synthesis
//!
//! This crate turns an OpenAPI/Swagger document into one structured test
//! case per operation. Generation is delegated to a [`Generator`] (usually an
//! LLM gateway); when it is unavailable the deterministic fallback rules in
//! [`synthesizer`] produce the whole case mapping instead.

pub mod analyzer;
pub mod case;
pub mod config;
pub mod error;
pub mod export;
pub mod generation;
pub mod handler;
pub mod model;
pub mod sample;
pub mod synthesizer;

pub use analyzer::analyze;
pub use case::{
    CaseMap, EnvelopeStatus, ExpectedResponse, ExpectedResponseSet, ParameterSet,
    RequestBodyCases, ResultEnvelope, TestCase, case_id,
};
pub use config::{Config, ConfigError, LoggingConfig, ProviderConfig, ServerConfig};
pub use error::{GenerationUnavailable, InvalidSpec, RequestError, SynthesisFailure};
pub use export::to_http_file;
pub use generation::{Generator, OfflineGenerator};
pub use handler::{handle, process};
pub use model::{Operation, ParamLocation, ParamType, Parameter, RequestBody, ResponseSpec};
pub use synthesizer::{Strategy, Synthesis, synthesize, synthesize_all};
