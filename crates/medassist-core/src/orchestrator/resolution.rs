use serde::{Deserialize, Serialize};

/// Outcome of resolving one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Resolution {
    /// Canned answer from the topic table.
    Knowledge { keyword: String, answer: String },
    /// Cleaned generation output.
    Generated { text: String },
    /// Generation failed; carries the apology.
    Fallback { text: String },
}

/// Which path produced a [`Resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    Knowledge,
    Generated,
    Fallback,
}

impl Resolution {
    pub fn source(&self) -> ResolutionSource {
        match self {
            Resolution::Knowledge { .. } => ResolutionSource::Knowledge,
            Resolution::Generated { .. } => ResolutionSource::Generated,
            Resolution::Fallback { .. } => ResolutionSource::Fallback,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Resolution::Knowledge { answer, .. } => answer,
            Resolution::Generated { text } | Resolution::Fallback { text } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Resolution::Knowledge { answer, .. } => answer,
            Resolution::Generated { text } | Resolution::Fallback { text } => text,
        }
    }
}
