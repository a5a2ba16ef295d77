//! Error types for the inference boundary, service startup, and the topic table.

use crate::inference::Device;

/// Failure of a single generation call. Recovered by the responder, never surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The backend answered but refused the work (overloaded, model not loaded, non-2xx).
    #[error("inference service unavailable: {0}")]
    Unavailable(String),
    /// The call never completed (transport failure, timeout).
    #[error("inference request failed: {0}")]
    Request(String),
    /// The backend answered with something that is not generated text.
    #[error("invalid inference response: {0}")]
    InvalidResponse(String),
    /// Generated text was blank after cleanup.
    #[error("inference service returned no usable text")]
    EmptyOutput,
}

/// Failure to produce a usable inference service at startup.
#[derive(Debug, thiserror::Error)]
pub enum InitializationError {
    #[error("{device} execution unavailable: {reason}")]
    Unavailable { device: Device, reason: String },
    /// Every execution path was tried and failed; startup cannot continue.
    #[error("no inference service could be initialized (accelerated: {accelerated}; cpu: {cpu})")]
    Exhausted { accelerated: String, cpu: String },
}

/// Invalid or unreadable topic table.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("topic keyword must not be empty")]
    EmptyKeyword,
    #[error("topic keyword must be lowercase: {0:?}")]
    NotLowercase(String),
    #[error("duplicate topic keyword: {0:?}")]
    DuplicateKeyword(String),
    #[error("failed to read topics file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse topics file: {0}")]
    Parse(#[from] toml::de::Error),
}
