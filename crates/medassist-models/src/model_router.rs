//! Model Router: sends a generation request to a mock model or a live text2text endpoint.

use medassist_core::{GenerationOptions, InferenceError, InferenceRequest, InferenceService};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BACKEND_NAME: &str = "ModelRouter";

/// Mode for LLM invocation: mock (returns simulated generation) or live (calls an HTTP endpoint).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LlmMode {
    #[default]
    Mock,
    Live,
}

impl LlmMode {
    /// "live" (any case) selects the live backend; anything else is mock.
    pub fn from_config(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("live") {
            LlmMode::Live
        } else {
            LlmMode::Mock
        }
    }
}

/// Connection details for a live text2text-generation endpoint.
#[derive(Clone, Debug)]
pub struct Endpoint {
    pub url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

// Hugging Face style text2text-generation request/response structures
#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
    options: RequestOptions,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_length: u32,
    min_length: u32,
    temperature: f32,
    repetition_penalty: f32,
    do_sample: bool,
}

impl From<GenerationOptions> for GenerationParameters {
    fn from(o: GenerationOptions) -> Self {
        Self {
            max_length: o.max_length,
            min_length: o.min_length,
            temperature: o.temperature,
            repetition_penalty: o.repetition_penalty,
            do_sample: o.do_sample,
        }
    }
}

#[derive(Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

#[derive(Deserialize)]
struct Generation {
    generated_text: String,
}

/// Endpoints answer either `[{"generated_text": ...}]` or a bare object.
#[derive(Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Batch(Vec<Generation>),
    Single(Generation),
}

impl GenerationResponse {
    fn into_text(self) -> Option<String> {
        match self {
            GenerationResponse::Batch(items) => items.into_iter().next().map(|g| g.generated_text),
            GenerationResponse::Single(g) => Some(g.generated_text),
        }
    }
}

/// Routes a prompt to a mock model or a live endpoint.
pub struct ModelRouter {
    mode: LlmMode,
    client: reqwest::Client,
    endpoint: Option<Endpoint>,
}

impl ModelRouter {
    /// Mock router; no network access.
    pub fn mock() -> Self {
        Self {
            mode: LlmMode::Mock,
            client: reqwest::Client::new(),
            endpoint: None,
        }
    }

    /// Live router bound to one endpoint. The client enforces `endpoint.timeout` on every call.
    pub fn live(endpoint: Endpoint) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(endpoint.timeout).build()?;
        Ok(Self {
            mode: LlmMode::Live,
            client,
            endpoint: Some(endpoint),
        })
    }

    /// Mock LLM: returns a deterministic "generated" answer based on the prompt's question line.
    /// Opens with "Answer:" like the real model often does, so cleanup is exercised end to end.
    fn mock_generate(&self, prompt: &str) -> String {
        let question = prompt
            .lines()
            .find_map(|l| l.trim().strip_prefix("Question:"))
            .map(str::trim)
            .unwrap_or("");
        let preview = question
            .chars()
            .take(80)
            .chain(if question.chars().count() > 80 { "…" } else { "" }.chars())
            .collect::<String>();
        format!(
            "Answer: [Generated – Mock LLM]\n\n## Overview\nYou asked: {}\n\n## When to seek care\nIf symptoms are severe or persistent, please contact a healthcare professional.",
            preview
        )
    }

    async fn live_generate(&self, request: &InferenceRequest) -> Result<String, InferenceError> {
        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or_else(|| InferenceError::Unavailable("no live endpoint configured".to_string()))?;

        let body = GenerationRequest {
            inputs: &request.prompt,
            parameters: request.options.into(),
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        tracing::info!(
            backend = BACKEND_NAME,
            model = %endpoint.model,
            prompt_len = request.prompt.len(),
            "Sending generation request"
        );

        let mut builder = self.client.post(&endpoint.url).json(&body);
        if let Some(key) = endpoint.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            builder = builder.bearer_auth(key.trim());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(InferenceError::Unavailable(format!(
                "{} returned {}: {}",
                endpoint.url,
                status,
                detail.chars().take(200).collect::<String>()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;
        parse_generation(&bytes)
    }
}

/// Extracts the generated text from a response body.
fn parse_generation(bytes: &[u8]) -> Result<String, InferenceError> {
    serde_json::from_slice::<GenerationResponse>(bytes)
        .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?
        .into_text()
        .ok_or_else(|| InferenceError::InvalidResponse("empty generation batch".to_string()))
}

impl Default for ModelRouter {
    fn default() -> Self {
        Self::mock()
    }
}

#[async_trait::async_trait]
impl InferenceService for ModelRouter {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn generate(&self, request: &InferenceRequest) -> Result<String, InferenceError> {
        match self.mode {
            LlmMode::Mock => Ok(self.mock_generate(&request.prompt)),
            LlmMode::Live => self.live_generate(request).await,
        }
    }
}
