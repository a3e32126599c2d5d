//! Error types for the request pipeline

use thiserror::Error;

/// Failure of the primary diagnosis call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("could not reach diagnosis service: {0}")]
    Network(String),
    #[error("diagnosis service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed diagnosis response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

/// Failure of the image lookup. Never surfaces past the pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnrichmentError {
    #[error("image lookup failed: {0}")]
    Network(String),
    #[error("image lookup returned {0}")]
    Status(u16),
    #[error("malformed image lookup response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for EnrichmentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            EnrichmentError::Decode(err.to_string())
        } else {
            EnrichmentError::Network(err.to_string())
        }
    }
}

/// Everything that can end a submit without a diagnosis
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("empty symptom description")]
    Validation,
    #[error("a request is already in flight")]
    Busy,
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("request task failed: {0}")]
    Task(String),
}
