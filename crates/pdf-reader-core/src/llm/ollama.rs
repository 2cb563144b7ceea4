use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use super::traits::{ChatMessage, ChatModel, ModelInfo};

/// Ollama native chat API (`/api/chat`).
pub struct OllamaChat {
    client: Client,
    /// Server root, e.g. "http://localhost:11434"
    pub api_base: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    #[serde(default)]
    status: String,
    error: Option<String>,
}

impl OllamaChat {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: super::http_client(config.timeout_secs)?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Make sure the model is present on the server, downloading it if needed.
    ///
    /// Blocks until the pull finishes; a model already present returns quickly.
    pub async fn pull(&self) -> Result<()> {
        let url = format!("{}/api/pull", self.api_base);
        info!("Pulling model {} from {}", self.model, url);

        let pull_error = |reason: String| Error::ModelPull {
            model: self.model.clone(),
            reason,
        };

        let response = self
            .client
            .post(&url)
            .json(&PullRequest {
                model: &self.model,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| pull_error(e.to_string()))?;

        let status = response.status();
        let body: PullResponse = response
            .json()
            .await
            .map_err(|e| pull_error(format!("HTTP {status}: {e}")))?;

        if let Some(reason) = body.error {
            return Err(pull_error(reason));
        }
        if !status.is_success() {
            return Err(pull_error(format!("HTTP {status}")));
        }

        debug!("Pull of {} finished with status '{}'", self.model, body.status);
        Ok(())
    }
}

#[async_trait]
impl ChatModel for OllamaChat {
    fn info(&self) -> ModelInfo {
        ModelInfo {
            backend: "Ollama",
            model: self.model.clone(),
        }
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/api/chat", self.api_base);
        debug!("Chat request with {} messages to {}", messages.len(), url);

        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::from_transport(&e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("API error: {} - {}", status, body);
            return Err(Error::LlmRequest(format!("HTTP {status}: {body}")));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::LlmInvalidResponse(e.to_string()))?;

        Ok(chat_response.message.content)
    }
}
