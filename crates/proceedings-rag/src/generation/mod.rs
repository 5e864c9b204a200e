//! Prompt construction for answers, summaries and topics

mod prompt;

pub use prompt::{truncate_chars, PromptBuilder};
