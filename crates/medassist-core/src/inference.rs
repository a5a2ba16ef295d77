//! Inference boundary: the text-generation capability the responder consumes, and the
//! startup policy that produces it.

use crate::error::{InferenceError, InitializationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Generation parameters. The defaults are fixed design constants; nothing user-facing changes them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub max_length: u32,
    pub min_length: u32,
    pub temperature: f32,
    /// Kept high: the underlying model tends to loop.
    pub repetition_penalty: f32,
    pub do_sample: bool,
}

impl GenerationOptions {
    pub const MAX_LENGTH: u32 = 500;
    pub const MIN_LENGTH: u32 = 100;
    pub const TEMPERATURE: f32 = 0.7;
    pub const REPETITION_PENALTY: f32 = 1.9;
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_length: Self::MAX_LENGTH,
            min_length: Self::MIN_LENGTH,
            temperature: Self::TEMPERATURE,
            repetition_penalty: Self::REPETITION_PENALTY,
            do_sample: true,
        }
    }
}

/// One generation call. Built fresh for every knowledge-base miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub prompt: String,
    pub options: GenerationOptions,
}

impl InferenceRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            options: GenerationOptions::default(),
        }
    }
}

/// Text-in/text-out generation capability. Shared for the process lifetime and only invoked.
#[async_trait::async_trait]
pub trait InferenceService: Send + Sync {
    /// Backend name for logs and status.
    fn name(&self) -> &str;

    /// Generates raw text for the request.
    async fn generate(&self, request: &InferenceRequest) -> Result<String, InferenceError>;
}

/// Execution target for loading the inference service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Accelerated,
    Cpu,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Accelerated => f.write_str("accelerated"),
            Device::Cpu => f.write_str("cpu"),
        }
    }
}

/// Builds an inference service for a given execution target.
pub trait ServiceLoader {
    fn load(&self, device: Device) -> Result<Arc<dyn InferenceService>, InitializationError>;
}

/// Startup policy: accelerated execution first, then exactly one CPU attempt.
///
/// When both fail the error is [`InitializationError::Exhausted`] and startup must abort.
pub fn initialize_service(
    loader: &dyn ServiceLoader,
) -> Result<Arc<dyn InferenceService>, InitializationError> {
    let accelerated = match loader.load(Device::Accelerated) {
        Ok(service) => {
            tracing::info!(backend = service.name(), device = %Device::Accelerated, "Inference service loaded");
            return Ok(service);
        }
        Err(e) => {
            tracing::error!(error = %e, "Error loading model on accelerated device, falling back to CPU");
            e.to_string()
        }
    };

    match loader.load(Device::Cpu) {
        Ok(service) => {
            tracing::info!(backend = service.name(), device = %Device::Cpu, "Inference service loaded");
            Ok(service)
        }
        Err(e) => {
            tracing::error!(error = %e, "Error loading model on CPU");
            Err(InitializationError::Exhausted {
                accelerated,
                cpu: e.to_string(),
            })
        }
    }
}
