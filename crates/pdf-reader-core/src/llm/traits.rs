use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One role-tagged turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Information about a model backend
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Backend name, e.g. "Ollama"
    pub backend: &'static str,
    /// Model identifier sent with each request
    pub model: String,
}

/// Trait for chat-completion backends
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Get information about this backend
    fn info(&self) -> ModelInfo;

    /// Send the whole conversation and return the reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}
