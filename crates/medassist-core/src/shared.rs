//! Shared types used across all MedAssist crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A user question, normalized once at construction (lowercased, surrounding whitespace trimmed).
///
/// There is no way to build a `Question` that skips normalization, so the matcher and the
/// responder always see the same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Question(String);

impl Question {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a conversation as stored by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Caller-owned, ordered conversation history.
///
/// The resolution pipeline never reads this; it exists so the UI layer can keep
/// its transcript without ambient global state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    messages: Vec<ChatMessage>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drops every message ("Clear Chat").
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Global application configuration (gateway + inference backend). Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Application identity shown in status responses.
    pub app_name: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// Inference backend: "mock" or "live".
    pub llm_mode: String,
    /// Model identifier forwarded to the live backend.
    pub model: String,
    /// Live endpoint used for CPU execution.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Live endpoint used for accelerated execution. Tried first at startup.
    #[serde(default)]
    pub accelerated_api_url: Option<String>,
    /// Optional bearer token for the live endpoints.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Timeout the live HTTP backend applies to each generation call.
    pub request_timeout_secs: u64,
    /// Optional TOML topics file. When set it replaces the built-in knowledge base.
    #[serde(default)]
    pub knowledge_path: Option<String>,
    /// Most chat sessions the gateway keeps in memory. The least recently active one is dropped first.
    pub max_sessions: usize,
}

impl CoreConfig {
    /// Load config from file and environment. Precedence: env `MEDASSIST_CONFIG` path > `config/gateway.toml` > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("MEDASSIST_CONFIG").unwrap_or_else(|_| "config/gateway".to_string());
        let builder = config::Config::builder()
            .set_default("app_name", "Healthcare Assistant")?
            .set_default("port", 8001_i64)?
            .set_default("llm_mode", "mock")?
            .set_default("model", "google/flan-t5-large")?
            .set_default("request_timeout_secs", 120_i64)?
            .set_default("max_sessions", 1000_i64)?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder.add_source(config::File::with_name(&config_path).required(false))
        };

        let built = builder
            .add_source(config::Environment::with_prefix("MEDASSIST").separator("__"))
            .build()?;

        built.try_deserialize()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            app_name: "Healthcare Assistant".to_string(),
            port: 8001,
            llm_mode: "mock".to_string(),
            model: "google/flan-t5-large".to_string(),
            api_url: None,
            accelerated_api_url: None,
            api_key: None,
            request_timeout_secs: 120,
            knowledge_path: None,
            max_sessions: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_is_lowercased_and_trimmed() {
        assert_eq!(Question::new("  I have a Fever today \n").as_str(), "i have a fever today");
        assert!(Question::new("   ").is_empty());
    }

    #[test]
    fn history_keeps_order_and_clears() {
        let mut history = ConversationHistory::new();
        history.push_user("what is the flu?");
        history.push_assistant("Common flu symptoms include:");
        assert_eq!(history.len(), 2);
        assert_eq!(history.messages()[0].role, Role::User);
        assert_eq!(history.messages()[1].role, Role::Assistant);

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn role_serializes_lowercase() {
        let msg = ChatMessage {
            role: Role::Assistant,
            content: "hi".to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let text = std::fs::read_to_string(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../config/gateway.toml"
        ))
        .unwrap();
        let shipped: CoreConfig = toml::from_str(&text).unwrap();
        let defaults = CoreConfig::default();
        assert_eq!(shipped.port, defaults.port);
        assert_eq!(shipped.llm_mode, defaults.llm_mode);
        assert_eq!(shipped.model, defaults.model);
        assert_eq!(shipped.request_timeout_secs, defaults.request_timeout_secs);
        assert_eq!(shipped.max_sessions, defaults.max_sessions);
        assert_eq!(shipped.knowledge_path, None);
    }
}
