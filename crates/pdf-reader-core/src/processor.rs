use tracing::debug;

use crate::config::Lang;
use crate::error::Result;
use crate::llm::{LlmClient, Transcript};
use crate::prompts;
use crate::util::collapse_whitespace;

/// Summaries, translations and chat on top of an [`LlmClient`].
///
/// `summarize` and `translate` each start from an empty history, so they
/// never see the chat and the chat never sees them. Only `chat` keeps its
/// history between calls.
#[derive(Debug)]
pub struct LanguageProcessor {
    client: LlmClient,
    target_lang: Lang,
    transcript: Transcript,
}

impl LanguageProcessor {
    pub const fn new(client: LlmClient, target_lang: Lang) -> Self {
        Self {
            client,
            target_lang,
            transcript: Vec::new(),
        }
    }

    /// Summarize `paragraphs` in about `words` words of the target language.
    ///
    /// The budget is only asked for in the prompt, never checked. With no
    /// paragraphs nothing is sent and the summary is empty.
    pub async fn summarize<T: AsRef<str>>(&self, paragraphs: &[T], words: usize) -> Result<String> {
        if paragraphs.is_empty() {
            return Ok(String::new());
        }

        debug!("Summarizing {} paragraphs in {} words", paragraphs.len(), words);
        let mut history = Transcript::new();
        self.client
            .call(&prompts::summary_task(words, &self.target_lang), &mut history)
            .await?;
        let summary = self
            .client
            .call(
                &prompts::summary_request(words, &self.target_lang, paragraphs),
                &mut history,
            )
            .await?;

        Ok(collapse_whitespace(&summary))
    }

    /// Translate `text` into the target language.
    pub async fn translate(&self, text: &str) -> Result<String> {
        let mut history = Transcript::new();
        self.client
            .call(&prompts::translation_task(&self.target_lang), &mut history)
            .await?;
        self.client.call(text, &mut history).await
    }

    /// Continue the running conversation with `message`.
    pub async fn chat(&mut self, message: &str) -> Result<String> {
        self.client.call(message, &mut self.transcript).await
    }

    /// Every chat turn so far, oldest first
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Forget the conversation
    pub fn reset_chat(&mut self) {
        self.transcript.clear();
    }

    pub const fn target_lang(&self) -> &Lang {
        &self.target_lang
    }

    pub const fn client(&self) -> &LlmClient {
        &self.client
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::llm::{ChatMessage, ChatModel, ModelInfo, Role};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Records every request and answers with a fixed reply.
    #[derive(Default)]
    struct Recorder {
        requests: Mutex<Vec<Vec<ChatMessage>>>,
        reply: String,
    }

    #[async_trait]
    impl ChatModel for Recorder {
        fn info(&self) -> ModelInfo {
            ModelInfo { backend: "recorder", model: "r".to_string() }
        }

        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            self.requests.lock().unwrap().push(messages.to_vec());
            Ok(self.reply.clone())
        }
    }

    fn processor(reply: &str) -> (LanguageProcessor, Arc<Recorder>) {
        let recorder = Arc::new(Recorder { reply: reply.to_string(), ..Default::default() });
        let client = LlmClient::new(recorder.clone());
        (LanguageProcessor::new(client, Lang::new("zh-CN")), recorder)
    }

    #[tokio::test]
    async fn test_summarize_is_two_turns_and_collapses_whitespace() {
        let (processor, recorder) = processor("浪潮   即将\t到来");
        let summary = processor.summarize(&["The wave is coming."][..], 100).await.unwrap();
        assert_eq!(summary, "浪潮 即将 到来");

        let requests = recorder.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].len(), 1);
        // Second request carries the first exchange plus the paragraphs
        assert_eq!(requests[1].len(), 3);
        assert_eq!(requests[1][1].role, Role::Assistant);
        assert!(requests[1][2].content.contains("The wave is coming."));
        assert!(requests[1][2].content.contains("within 100 words"));
    }

    #[tokio::test]
    async fn test_summarize_nothing_sends_nothing() {
        let (processor, recorder) = processor("unused");
        let empty: [&str; 0] = [];
        assert_eq!(processor.summarize(&empty[..], 300).await.unwrap(), "");
        assert!(recorder.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_translate_uses_fresh_history_each_time() {
        let (processor, recorder) = processor("译文");
        assert_eq!(processor.translate("First.").await.unwrap(), "译文");
        assert_eq!(processor.translate("Second.").await.unwrap(), "译文");

        let requests = recorder.requests.lock().unwrap();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[3].len(), 3);
        assert_eq!(requests[3][2].content, "Second.");
        assert!(!requests[3].iter().any(|m| m.content == "First."));
    }

    #[tokio::test]
    async fn test_chat_is_cumulative_and_isolated() {
        let (mut processor, recorder) = processor("ok");
        for (i, message) in ["hi", "what is the wave?", "thanks"].iter().enumerate() {
            processor.chat(message).await.unwrap();
            assert_eq!(processor.transcript().len(), 2 * (i + 1));
        }

        processor.translate("Unrelated.").await.unwrap();
        assert_eq!(processor.transcript().len(), 6);
        assert!(!processor.transcript().iter().any(|m| m.content == "Unrelated."));

        let requests = recorder.requests.lock().unwrap();
        assert_eq!(requests[2].len(), 5);
        drop(requests);

        processor.reset_chat();
        assert!(processor.transcript().is_empty());
    }
}
