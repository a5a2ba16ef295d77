//! Immutable, ordered topic table built once at startup.

use super::builtin::BUILTIN_TOPICS;
use super::{KnowledgeSource, TopicEntry};
use crate::error::KnowledgeError;
use crate::shared::Question;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// On-disk layout of a topics file:
///
/// ```toml
/// [[topics]]
/// keyword = "flu"
/// answer = """Common flu symptoms include: ..."""
/// ```
#[derive(Deserialize)]
struct TopicsFile {
    #[serde(default)]
    topics: Vec<TopicEntry>,
}

/// Ordered keyword table. Iteration order is insertion order and decides ties.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<TopicEntry>,
}

impl KnowledgeBase {
    /// Validates and freezes `entries`. Keywords must be non-empty, lowercase, and unique.
    pub fn new(entries: Vec<TopicEntry>) -> Result<Self, KnowledgeError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.keyword.trim().is_empty() {
                return Err(KnowledgeError::EmptyKeyword);
            }
            if entry.keyword != entry.keyword.to_lowercase() {
                return Err(KnowledgeError::NotLowercase(entry.keyword.clone()));
            }
            if !seen.insert(entry.keyword.as_str()) {
                return Err(KnowledgeError::DuplicateKeyword(entry.keyword.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// The table shipped with the application: `flu`, then `fever`.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_TOPICS
                .iter()
                .map(|(keyword, answer)| TopicEntry::new(*keyword, *answer))
                .collect(),
        }
    }

    /// Parses a `[[topics]]` TOML document, keeping file order.
    pub fn from_toml_str(s: &str) -> Result<Self, KnowledgeError> {
        let file: TopicsFile = toml::from_str(s)?;
        Self::new(file.topics)
    }

    /// Reads and parses a topics file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, KnowledgeError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Topics file when configured, built-in table otherwise.
    pub fn load(knowledge_path: Option<&str>) -> Result<Self, KnowledgeError> {
        match knowledge_path {
            Some(path) => {
                let kb = Self::from_path(path)?;
                tracing::info!(path, topics = kb.len(), "Loaded knowledge base from file");
                Ok(kb)
            }
            None => Ok(Self::builtin()),
        }
    }

    /// First entry (in table order) whose keyword occurs anywhere in the question.
    ///
    /// Plain substring containment: "fever" also matches "feverish".
    pub fn find(&self, question: &Question) -> Option<&TopicEntry> {
        let text = question.as_str();
        self.entries
            .iter()
            .find(|entry| text.contains(entry.keyword.as_str()))
    }

    /// Canned answer for the question, verbatim.
    pub fn match_answer(&self, question: &Question) -> Option<&str> {
        self.find(question).map(|entry| entry.answer.as_str())
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.keyword.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KnowledgeSource for KnowledgeBase {
    fn name(&self) -> &str {
        "topic_knowledge_base"
    }

    fn lookup(&self, question: &Question) -> Option<&TopicEntry> {
        self.find(question)
    }
}
