//! Q&A request types

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One prior turn of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `user` for the asker; anything else is the assistant
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    /// Whether this turn came from the user
    pub fn is_user(&self) -> bool {
        self.role == "user"
    }
}

/// Body of `POST /api/sessions/:filename/qa`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QaRequest {
    /// The question to answer
    #[serde(default)]
    pub question: String,
    /// Prior conversation, oldest first
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
}

impl QaRequest {
    /// Return the trimmed question or a validation error
    pub fn validated_question(&self) -> Result<&str> {
        let question = self.question.trim();
        if question.is_empty() {
            return Err(Error::validation("Question is required"));
        }
        Ok(question)
    }
}
