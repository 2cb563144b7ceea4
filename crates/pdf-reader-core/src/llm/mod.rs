mod client;
mod ollama;
mod openai;
mod traits;

pub use client::{LlmClient, Transcript};
pub use ollama::OllamaChat;
pub use openai::OpenAiChat;
pub use traits::{ChatMessage, ChatModel, ModelInfo, Role};

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::config::{Backend, LlmConfig};
use crate::error::{Error, Result};

/// Create a chat backend from configuration
pub fn create_chat_model(config: &LlmConfig) -> Result<Arc<dyn ChatModel>> {
    let model: Arc<dyn ChatModel> = match config.backend {
        Backend::Ollama => Arc::new(OllamaChat::new(config)?),
        Backend::OpenAi => Arc::new(OpenAiChat::new(config)?),
    };
    Ok(model)
}

/// HTTP client shared by the backends. No timeout unless one is configured.
fn http_client(timeout_secs: Option<u64>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| Error::LlmRequest(format!("Failed to create HTTP client: {e}")))
}
