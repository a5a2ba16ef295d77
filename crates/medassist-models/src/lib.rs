//! Inference backends for the healthcare assistant.

mod loader;
mod model_router;

pub use loader::ModelLoader;
pub use model_router::{Endpoint, LlmMode, ModelRouter};
