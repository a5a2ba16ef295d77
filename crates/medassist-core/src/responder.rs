//! Generative responder: prompt construction, one inference call, apology fallback, cleanup.

use crate::error::InferenceError;
use crate::inference::{InferenceRequest, InferenceService};
use crate::orchestrator::Resolution;
use crate::shared::Question;
use std::sync::Arc;

/// Returned whenever generation fails. Always a complete, display-ready message.
pub const APOLOGY_MESSAGE: &str =
    "I apologize, but I'm having trouble generating a response. Please try rephrasing your question.";

/// Boilerplate the model likes to open with. Longest first so "Medical answer:" is not left half-stripped.
const BOILERPLATE_PREFIXES: [&str; 2] = ["Medical answer:", "Answer:"];

/// The five structural guidelines, in the order the answer should follow.
pub const STRUCTURE_GUIDELINES: [&str; 5] = [
    "Start with a concise definition or overview if relevant",
    "List specific symptoms, signs, or key points in a structured manner",
    "Include important warning signs or red flags if applicable",
    "Mention when immediate medical attention is necessary",
    "Add preventive measures or self-care tips when appropriate",
];

/// Builds the generation prompt. Pure function of the normalized question.
pub fn build_prompt(question: &Question) -> String {
    let mut prompt = String::from(
        "As a medical professional, provide a clear, accurate, and detailed response to the following question.\n",
    );
    prompt.push_str("Follow these guidelines:\n");
    for (i, guideline) in STRUCTURE_GUIDELINES.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, guideline));
    }
    prompt.push_str(&format!("\nQuestion: {}\n\n", question.as_str()));
    prompt.push_str("Structure the response with appropriate headings and clear sections.\n");
    prompt.push_str("Focus on medically verified information and avoid speculative advice.\n");
    prompt.push_str(
        "If the condition is serious, emphasize the importance of seeking professional medical care.\n",
    );
    prompt.push_str("\nDetailed medical response:");
    prompt
}

/// Strips leading "Answer:" / "Medical answer:" labels and surrounding whitespace.
pub fn clean_response(raw: &str) -> String {
    let mut text = raw.trim();
    while let Some(rest) = BOILERPLATE_PREFIXES
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
    {
        text = rest.trim_start();
    }
    text.trim().to_string()
}

/// Answers knowledge-base misses through the inference service.
#[derive(Clone)]
pub struct GenerativeResponder {
    service: Arc<dyn InferenceService>,
}

impl GenerativeResponder {
    pub fn new(service: Arc<dyn InferenceService>) -> Self {
        Self { service }
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Generates and cleans an answer. Inference errors end in [`APOLOGY_MESSAGE`]; nothing is retried.
    pub async fn respond(&self, question: &Question) -> String {
        self.resolve(question).await.into_text()
    }

    /// Runs the generation path and applies the failure policy, reporting which outcome it was.
    pub async fn resolve(&self, question: &Question) -> Resolution {
        match self.generate(question).await {
            Ok(text) => {
                tracing::info!(backend = self.service.name(), "Resolved by generation");
                Resolution::Generated { text }
            }
            Err(e) => {
                tracing::error!(backend = self.service.name(), error = %e, "Model error");
                Resolution::Fallback {
                    text: APOLOGY_MESSAGE.to_string(),
                }
            }
        }
    }

    /// Generation without the failure policy; errors stay visible to the caller.
    pub async fn generate(&self, question: &Question) -> Result<String, InferenceError> {
        let request = InferenceRequest::new(build_prompt(question));
        tracing::debug!(
            backend = self.service.name(),
            prompt_len = request.prompt.len(),
            "Invoking inference service"
        );
        let raw = self.service.generate(&request).await?;
        let cleaned = clean_response(&raw);
        if cleaned.is_empty() {
            return Err(InferenceError::EmptyOutput);
        }
        Ok(cleaned)
    }
}
