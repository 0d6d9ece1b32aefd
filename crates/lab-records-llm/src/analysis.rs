//! Analysis request types and the collaborator trait.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::messages;

/// Analysis errors.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No connectivity")]
    Offline,

    #[error("API key not configured")]
    MissingApiKey,

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Model service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Response parse error: {0}")]
    ResponseParsing(String),

    #[error("Model returned no text")]
    EmptyResponse,
}

impl AnalysisError {
    /// The localized explanation shown to the operator in place of a narrative.
    pub fn localized_message(&self) -> &'static str {
        match self {
            AnalysisError::Offline => messages::OFFLINE,
            AnalysisError::MissingApiKey => messages::MISSING_API_KEY,
            AnalysisError::EmptyResponse => messages::EMPTY_RESPONSE,
            AnalysisError::HttpClient(_)
            | AnalysisError::Timeout(_)
            | AnalysisError::Service { .. }
            | AnalysisError::ResponseParsing(_) => messages::REQUEST_FAILED,
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Everything the model sees about a visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRequest {
    /// Patient age in years
    pub age: u32,
    /// Display label of the patient's gender
    pub gender: String,
    /// One row per stored result, in result order
    pub rows: Vec<AnalysisRow>,
}

/// A single result line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRow {
    pub test_name: String,
    pub value: String,
    pub unit: String,
    pub normal_range: String,
}

/// An external service that turns results into narrative text.
pub trait LabAnalyzer: Send + Sync {
    /// Produce a narrative for the request.
    fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult<String>;
}

/// Mock analyzer for testing without a model service.
pub struct MockAnalyzer {
    response: Result<String, fn() -> AnalysisError>,
    calls: AtomicUsize,
}

impl MockAnalyzer {
    /// Always answer with the given narrative.
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with the error produced by `make_error`.
    pub fn failing(make_error: fn() -> AnalysisError) -> Self {
        Self {
            response: Err(make_error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `analyze` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LabAnalyzer for MockAnalyzer {
    fn analyze(&self, _request: &AnalysisRequest) -> AnalysisResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(make_error) => Err(make_error()),
        }
    }
}
