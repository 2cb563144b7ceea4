use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::util::strip_newlines;
use super::traits::{ChatMessage, ChatModel, ModelInfo};

/// Ordered conversation history, oldest first
pub type Transcript = Vec<ChatMessage>;

/// Turns a history plus new user text into one model round trip.
#[derive(Clone)]
pub struct LlmClient {
    model: Arc<dyn ChatModel>,
}

impl LlmClient {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub fn info(&self) -> ModelInfo {
        self.model.info()
    }

    /// Send `text` as the next user turn of `history` and record the reply.
    ///
    /// On success `history` has grown by one user and one assistant turn and
    /// the reply (with line breaks removed) is returned. On failure the error
    /// is passed through untouched and `history` is left as it was.
    pub async fn call(&self, text: &str, history: &mut Transcript) -> Result<String> {
        history.push(ChatMessage::user(text));

        let reply = match self.model.complete(history.as_slice()).await {
            Ok(reply) => strip_newlines(&reply),
            Err(e) => {
                history.pop();
                return Err(e);
            }
        };

        debug!("Reply of {} chars after {} turns", reply.len(), history.len());
        history.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let info = self.model.info();
        f.debug_struct("LlmClient")
            .field("backend", &info.backend)
            .field("model", &info.model)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::llm::Role;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl ChatModel for Echo {
        fn info(&self) -> ModelInfo {
            ModelInfo { backend: "echo", model: "echo".to_string() }
        }

        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            if last == "fail" {
                return Err(Error::LlmRequest("refused".to_string()));
            }
            Ok(format!("turns={}\nlast={last}\n", messages.len()))
        }
    }

    #[tokio::test]
    async fn test_call_strips_newlines_and_records_turns() {
        let client = LlmClient::new(Arc::new(Echo));
        let mut history = Transcript::new();

        let reply = client.call("hello", &mut history).await.unwrap();
        assert_eq!(reply, "turns=1last=hello");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], ChatMessage::user("hello"));
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, reply);

        // The whole history goes out with the next call
        let reply = client.call("again", &mut history).await.unwrap();
        assert_eq!(reply, "turns=3last=again");
        assert_eq!(history.len(), 4);
    }

    #[tokio::test]
    async fn test_failed_call_leaves_history_untouched() {
        let client = LlmClient::new(Arc::new(Echo));
        let mut history = Transcript::new();
        client.call("hello", &mut history).await.unwrap();

        let err = client.call("fail", &mut history).await.unwrap_err();
        assert!(matches!(err, Error::LlmRequest(_)));
        assert_eq!(history.len(), 2);
    }
}
