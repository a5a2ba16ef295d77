//! medassist-core: healthcare assistant core (shared types, topic knowledge base,
//! generative responder, and the question resolution pipeline).
//!
//! The inference runtime itself is not implemented here; it is consumed through
//! [`InferenceService`] and built at startup through [`ServiceLoader`].

mod error;
mod inference;
mod knowledge;
mod orchestrator;
mod responder;
mod shared;

// Shared
pub use shared::{ChatMessage, ConversationHistory, CoreConfig, Question, Role};

// Errors
pub use error::{InferenceError, InitializationError, KnowledgeError};

// Inference boundary
pub use inference::{
    initialize_service, Device, GenerationOptions, InferenceRequest, InferenceService,
    ServiceLoader,
};

// Knowledge
pub use knowledge::{KnowledgeBase, KnowledgeSource, TopicEntry};

// Responder
pub use responder::{
    build_prompt, clean_response, GenerativeResponder, APOLOGY_MESSAGE, STRUCTURE_GUIDELINES,
};

// Orchestrator
pub use orchestrator::{Orchestrator, Resolution, ResolutionSource};
