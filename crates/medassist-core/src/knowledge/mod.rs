//! Topic knowledge base: keyword → canned answer, matched by substring containment.
//!
//! | Keyword | Answer                                   |
//! |---------|------------------------------------------|
//! | flu     | Common flu symptoms (built-in)           |
//! | fever   | Common fever symptoms (built-in)         |
//!
//! Table order is significant: when several keywords occur in one question the entry listed
//! first wins.

mod builtin;
mod store;

pub use store::KnowledgeBase;

use crate::shared::Question;
use serde::{Deserialize, Serialize};

/// A static keyword-to-canned-answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry {
    pub keyword: String,
    pub answer: String,
}

impl TopicEntry {
    pub fn new(keyword: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            answer: answer.into(),
        }
    }
}

/// Common trait for sources the orchestrator checks before generating.
pub trait KnowledgeSource: Send + Sync {
    /// Human-readable name for this knowledge source.
    fn name(&self) -> &str;

    /// Returns the entry answering `question`, if any. Must not have side effects.
    fn lookup(&self, question: &Question) -> Option<&TopicEntry>;
}
