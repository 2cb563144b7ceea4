use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Language codes following ISO 639-1 with regional variants
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable name used inside prompts
    pub fn display_name(&self) -> &'static str {
        match self.as_str() {
            "en" => "English",
            "zh-CN" => "simplified Chinese",
            "zh-TW" => "traditional Chinese",
            "ja" => "Japanese",
            "ko" => "Korean",
            "es" => "Spanish",
            "fr" => "French",
            "de" => "German",
            "it" => "Italian",
            "pt" => "Portuguese",
            "ru" => "Russian",
            // The model still understands most ISO codes
            _ => "the specified language",
        }
    }
}

fn default_target_lang() -> Lang {
    Lang::new("zh-CN")
}

impl Default for Lang {
    fn default() -> Self {
        default_target_lang()
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which wire protocol the model service speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Ollama native `/api/chat`
    #[default]
    Ollama,
    /// OpenAI-compatible `/chat/completions` (llama.cpp, vLLM, OpenAI, ...)
    OpenAi,
}

impl Backend {
    pub const fn default_api_base(self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434",
            Self::OpenAi => "http://localhost:8080/v1",
        }
    }
}

/// Model service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-request timeout in seconds (unset = wait indefinitely)
    pub timeout_secs: Option<u64>,
}

impl LlmConfig {
    pub fn new(backend: Backend, api_base: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            backend,
            api_base: api_base.into(),
            api_key: None,
            model: model.into(),
            timeout_secs: None,
        }
    }
}

fn default_api_base() -> String {
    Backend::Ollama.default_api_base().to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::new(Backend::Ollama, default_api_base(), default_model())
    }
}

/// Which document is read, which pages of it, and where its snapshot lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    #[serde(default = "default_pdf_path")]
    pub pdf_path: PathBuf,

    /// First page of the book body (0-indexed, inclusive)
    #[serde(default = "default_first_page")]
    pub first_page: usize,

    /// Last page of the book body (0-indexed, inclusive)
    #[serde(default = "default_last_page")]
    pub last_page: usize,

    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Drop every character outside the Latin text class while extracting
    #[serde(default = "default_true")]
    pub latin_only: bool,
}

fn default_pdf_path() -> PathBuf {
    PathBuf::from("THE COMING WAVE.pdf")
}

const fn default_first_page() -> usize {
    15
}

const fn default_last_page() -> usize {
    306
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("document_text.json")
}

const fn default_true() -> bool {
    true
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            pdf_path: default_pdf_path(),
            first_page: default_first_page(),
            last_page: default_last_page(),
            snapshot_path: default_snapshot_path(),
            latin_only: true,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language translations and summaries are written in
    #[serde(default = "default_target_lang")]
    pub target_lang: Lang,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub document: DocumentConfig,
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        toml::from_str(&content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))
    }

    /// Load from default locations (~/.config/pdf-reader/config.toml, ./config.toml)
    pub fn load() -> Self {
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("pdf-reader").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        let local_config = PathBuf::from("config.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./config.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./config.toml: {}", e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }

    /// Reject settings no component can work with.
    pub fn validate(&self) -> Result<()> {
        let doc = &self.document;
        if doc.first_page > doc.last_page {
            return Err(Error::ConfigInvalid {
                field: "document.first_page".to_string(),
                reason: format!(
                    "first page {} is after last page {}",
                    doc.first_page, doc.last_page
                ),
            });
        }
        if self.llm.model.trim().is_empty() {
            return Err(Error::ConfigInvalid {
                field: "llm.model".to_string(),
                reason: "model name is empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Default model served by the local Ollama instance
pub const DEFAULT_MODEL: &str = "glm4:9b";

/// Word budgets of the three page summaries, shortest first
pub const SUMMARY_LENGTHS: [usize; 3] = [100, 200, 300];

/// Models known to handle Chinese/English translation well on a single GPU.
pub fn suggested_models() -> Vec<&'static str> {
    vec![
        "glm4:9b",
        "qwen2.5:7b",
        "qwen2.5:14b",
        "qwen2.5-coder:7b",
        "qwen2.5-coder:14b",
        "deepseek-coder-v2:16b",
    ]
}
