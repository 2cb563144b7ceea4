//! PDF Reader Core Library
//!
//! This library provides the core of a PDF reading assistant:
//! - Paragraph extraction from PDF text blocks
//! - A per-page cache of paragraphs, translations and summaries, persisted as JSON
//! - Summaries, translations and chat via Ollama or OpenAI-compatible APIs
//! - Rolling summaries over runs of consecutive paragraphs
//! - Page navigation that skips pages without text

pub mod cache;
pub mod config;
pub mod error;
pub mod llm;
pub mod navigation;
pub mod paragraph;
pub mod pdf;
pub mod processor;
pub mod prompts;
pub mod sections;
pub mod util;

pub use cache::{DocumentCache, PageRecord, PreprocessReport};
pub use config::{
    AppConfig, Backend, DocumentConfig, Lang, LlmConfig, DEFAULT_MODEL, SUMMARY_LENGTHS,
    suggested_models,
};
pub use error::{Error, Result};
pub use llm::{ChatMessage, ChatModel, LlmClient, ModelInfo, Role, Transcript, create_chat_model};
pub use navigation::PageCursor;
pub use paragraph::{Paragraph, ParagraphAccumulator, ParagraphExtractor};
pub use pdf::{FragmentSource, PdfDocument, TextExtractor};
pub use processor::LanguageProcessor;
pub use sections::{SectionSummary, sections};

use std::sync::Arc;
use tracing::{debug, info};

/// High-level reader that combines all components
pub struct Reader {
    cache: DocumentCache,
    processor: LanguageProcessor,
    config: AppConfig,
}

impl Reader {
    /// Open the configured book: load its snapshot, or extract it from the PDF.
    pub fn open(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let model = create_chat_model(&config.llm)?;
        let cache = DocumentCache::open(&config.document, || {
            info!("Opening {}", config.document.pdf_path.display());
            let pdf = PdfDocument::from_file(&config.document.pdf_path)?;
            TextExtractor::new(&pdf)
        })?;
        Ok(Self::with_model(model, cache, config))
    }

    /// Create with a custom model backend and an already built cache
    pub fn with_model(model: Arc<dyn ChatModel>, cache: DocumentCache, config: AppConfig) -> Self {
        let processor = LanguageProcessor::new(LlmClient::new(model), config.target_lang.clone());
        Self {
            cache,
            processor,
            config,
        }
    }

    /// Translate and summarize every page still missing something.
    pub async fn preprocess(
        &mut self,
        progress_callback: Option<Box<dyn Fn(usize, usize) + Send>>,
    ) -> Result<PreprocessReport> {
        self.cache.preprocess(&self.processor, progress_callback).await
    }

    /// Translations of `page`, computing and storing them if needed.
    pub async fn translate_page(&mut self, page: usize) -> Result<&[String]> {
        let needs_translation = self.cache.page(page).is_some_and(|r| !r.is_translated());

        if needs_translation {
            info!("Translating page {} with {}", page, self.processor.client().info().backend);
            let paragraphs = self.cache.paragraphs(page).to_vec();
            let mut translations = Vec::with_capacity(paragraphs.len());
            for paragraph in &paragraphs {
                translations.push(self.processor.translate(paragraph).await?);
            }
            if let Some(record) = self.cache.page_mut(page) {
                record.translations = translations;
            }
            self.cache.save()?;
        } else {
            debug!("Page {} already translated", page);
        }

        Ok(self
            .cache
            .page(page)
            .map(|r| r.translations.as_slice())
            .unwrap_or_default())
    }

    /// Summary of `page` in about `words` words.
    ///
    /// Budgets from [`SUMMARY_LENGTHS`] are stored in the cache and reused;
    /// any other budget is computed on every call. Empty pages summarize to
    /// an empty string without a request.
    pub async fn summarize_page(&mut self, page: usize, words: usize) -> Result<String> {
        if let Some(summary) = self.cache.page(page).and_then(|r| r.summary(words)) {
            debug!("Page {} already has a {}-word summary", page, words);
            return Ok(summary.to_string());
        }
        if self.cache.is_empty_page(page) {
            return Ok(String::new());
        }

        let paragraphs = self.cache.paragraphs(page).to_vec();
        let summary = self.processor.summarize(&paragraphs, words).await?;

        if let Some(slot) = SUMMARY_LENGTHS.iter().position(|&w| w == words)
            && let Some(record) = self.cache.page_mut(page)
        {
            record.summaries[slot].clone_from(&summary);
            self.cache.save()?;
        }
        Ok(summary)
    }

    /// Talk to the model; the conversation persists for the reader's lifetime.
    pub async fn chat(&mut self, message: &str) -> Result<String> {
        self.processor.chat(message).await
    }

    pub const fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    pub const fn processor(&self) -> &LanguageProcessor {
        &self.processor
    }

    pub const fn processor_mut(&mut self) -> &mut LanguageProcessor {
        &mut self.processor
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn model_info(&self) -> ModelInfo {
        self.processor.client().info()
    }
}
