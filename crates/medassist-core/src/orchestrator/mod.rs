//! Resolution pipeline: knowledge base first, generative responder on a miss.

mod resolution;

pub use resolution::{Resolution, ResolutionSource};

use crate::inference::InferenceService;
use crate::knowledge::{KnowledgeBase, KnowledgeSource};
use crate::responder::GenerativeResponder;
use crate::shared::Question;
use std::sync::Arc;

/// Orchestrator routes each question down exactly one path: canned answer or generation.
pub struct Orchestrator {
    knowledge: Arc<dyn KnowledgeSource>,
    responder: GenerativeResponder,
}

impl Orchestrator {
    pub fn new(knowledge: Arc<dyn KnowledgeSource>, service: Arc<dyn InferenceService>) -> Self {
        Self {
            knowledge,
            responder: GenerativeResponder::new(service),
        }
    }

    /// Orchestrator over the built-in topic table.
    pub fn with_builtin_knowledge(service: Arc<dyn InferenceService>) -> Self {
        Self::new(Arc::new(KnowledgeBase::builtin()), service)
    }

    pub fn responder(&self) -> &GenerativeResponder {
        &self.responder
    }

    /// Resolves a raw question to display-ready text. Never fails.
    pub async fn resolve(&self, question: &str) -> String {
        self.resolve_detailed(question).await.into_text()
    }

    /// Like [`resolve`](Self::resolve), but reports which path produced the answer.
    pub async fn resolve_detailed(&self, question: &str) -> Resolution {
        let question = Question::new(question);

        if let Some(entry) = self.knowledge.lookup(&question) {
            tracing::info!(
                source = self.knowledge.name(),
                keyword = %entry.keyword,
                "Resolved from knowledge base"
            );
            return Resolution::Knowledge {
                keyword: entry.keyword.clone(),
                answer: entry.answer.clone(),
            };
        }

        self.responder.resolve(&question).await
    }
}
