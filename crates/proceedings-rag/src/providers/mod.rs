//! Provider abstractions for the generative backend
//!
//! Services depend on the `LlmProvider` trait only, so tests can swap in a
//! scripted implementation.

pub mod gemini;
pub mod llm;

pub use gemini::GeminiClient;
pub use llm::LlmProvider;
