//! LLM provider trait for text generation

use async_trait::async_trait;
use crate::error::Result;

/// Trait for the generative text backend
///
/// One instance is created at startup and shared by every service through
/// `Arc<dyn LlmProvider>`.
///
/// Implementations:
/// - `GeminiClient`: Google Generative Language API (gemini-pro)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is configured and reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
