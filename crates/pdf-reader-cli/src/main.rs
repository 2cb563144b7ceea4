//! PDF Reader CLI - read a book page by page with translations, summaries and chat.

mod interactive;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_reader_core::llm::OllamaChat;
use pdf_reader_core::util::wrap_chars;
use pdf_reader_core::{
    AppConfig, Backend, FragmentSource, LanguageProcessor, Lang, LlmClient, Paragraph,
    ParagraphExtractor, PdfDocument, Reader, SUMMARY_LENGTHS, SectionSummary, TextExtractor,
    create_chat_model, sections, suggested_models,
};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendOption {
    Ollama,
    Openai,
}

impl From<BackendOption> for Backend {
    fn from(opt: BackendOption) -> Self {
        match opt {
            BackendOption::Ollama => Self::Ollama,
            BackendOption::Openai => Self::OpenAi,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pdf-reader")]
#[command(author, version, about = "Read a PDF book with LLM translations and summaries", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// PDF file to read
    #[arg(long, global = true)]
    pdf: Option<PathBuf>,

    /// First page of the book body (0-indexed)
    #[arg(long, global = true)]
    first_page: Option<usize>,

    /// Last page of the book body (0-indexed, inclusive)
    #[arg(long, global = true)]
    last_page: Option<usize>,

    /// Snapshot file holding paragraphs, translations and summaries
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Language to translate and summarize into
    #[arg(short = 't', long, global = true)]
    target: Option<String>,

    /// Keep non-Latin characters when extracting paragraphs
    #[arg(long, global = true)]
    keep_all_chars: bool,

    /// Model service protocol
    #[arg(long, value_enum, global = true)]
    backend: Option<BackendOption>,

    /// Model service base URL
    #[arg(long, env = "PDF_READER_API_BASE", global = true)]
    api_base: Option<String>,

    /// API key for OpenAI-compatible services
    #[arg(long, env = "OPENAI_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Model name
    #[arg(long, env = "PDF_READER_MODEL", global = true)]
    model: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Pull the model onto the Ollama server before starting
    #[arg(long, global = true)]
    pull: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the paragraphs extracted from the PDF (ignores the snapshot)
    Extract {
        /// Print one JSON object per paragraph
        #[arg(long)]
        json: bool,
    },
    /// Summarize runs of consecutive paragraphs straight from the PDF
    Summarize {
        /// Paragraphs per summary
        #[arg(short = 'n', long, default_value = "4")]
        paragraphs: NonZeroUsize,
        /// Word budget of each summary
        #[arg(short, long, default_value_t = 150)]
        words: usize,
        /// Wrap summaries at this many characters
        #[arg(long, default_value = "60")]
        width: NonZeroUsize,
    },
    /// Translate and summarize every page, saving after each one
    Preprocess,
    /// Print one page with its translation and summaries
    Show {
        /// Page number (0-indexed)
        page: usize,
        /// Translate the page if it is not translated yet
        #[arg(long)]
        translate: bool,
        /// Print (and compute if needed) the summary with this word budget
        #[arg(long)]
        summary: Option<usize>,
    },
    /// Page through the book interactively
    Read {
        /// Page to start on
        #[arg(long)]
        page: Option<usize>,
    },
    /// Chat with the model
    Chat,
    /// List models known to work well
    Models,
}

impl Args {
    /// Fold command-line overrides into the loaded configuration
    fn apply(&self, config: &mut AppConfig) {
        let doc = &mut config.document;
        if let Some(ref pdf) = self.pdf {
            doc.pdf_path.clone_from(pdf);
        }
        if let Some(first) = self.first_page {
            doc.first_page = first;
        }
        if let Some(last) = self.last_page {
            doc.last_page = last;
        }
        if let Some(ref snapshot) = self.snapshot {
            doc.snapshot_path.clone_from(snapshot);
        }
        if self.keep_all_chars {
            doc.latin_only = false;
        }

        if let Some(ref target) = self.target {
            config.target_lang = Lang::new(target);
        }

        let llm = &mut config.llm;
        if let Some(backend) = self.backend {
            llm.backend = backend.into();
            if self.api_base.is_none() {
                llm.api_base = llm.backend.default_api_base().to_string();
            }
        }
        if let Some(ref api_base) = self.api_base {
            llm.api_base.clone_from(api_base);
        }
        if self.api_key.is_some() {
            llm.api_key.clone_from(&self.api_key);
        }
        if let Some(ref model) = self.model {
            llm.model.clone_from(model);
        }
        if self.timeout.is_some() {
            llm.timeout_secs = self.timeout;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    if args.pull {
        if config.llm.backend == Backend::Ollama {
            OllamaChat::new(&config.llm)?
                .pull()
                .await
                .context("Failed to pull model")?;
        } else {
            tracing::warn!("--pull only applies to the Ollama backend, ignoring");
        }
    }

    match args.command {
        Command::Extract { json } => extract(&config, json),
        Command::Summarize {
            paragraphs,
            words,
            width,
        } => summarize(&config, paragraphs, words, width).await,
        Command::Preprocess => preprocess(config).await,
        Command::Show {
            page,
            translate,
            summary,
        } => show(config, page, translate, summary).await,
        Command::Read { page } => interactive::read(open_reader(config)?, page).await,
        Command::Chat => interactive::chat(open_reader(config)?).await,
        Command::Models => {
            list_models(&config);
            Ok(())
        }
    }
}

fn open_reader(config: AppConfig) -> Result<Reader> {
    let snapshot = config.document.snapshot_path.clone();
    let reader = Reader::open(config)
        .with_context(|| format!("Failed to open book (snapshot: {})", snapshot.display()))?;
    let info = reader.model_info();
    info!("Using {} model {}", info.backend, info.model);
    Ok(reader)
}

/// Paragraphs of the configured range, read from the PDF itself
fn extract_paragraphs(config: &AppConfig) -> Result<Vec<Paragraph>> {
    let doc = &config.document;
    info!("Loading PDF: {}", doc.pdf_path.display());
    let pdf = PdfDocument::from_file(&doc.pdf_path)
        .with_context(|| format!("Failed to load PDF: {}", doc.pdf_path.display()))?;
    let source = TextExtractor::new(&pdf)?;
    info!("Document has {} pages", source.page_count());

    ParagraphExtractor::new(doc.latin_only)
        .extract(&source, doc.first_page..=doc.last_page)
        .context("Failed to extract paragraphs")
}

#[allow(clippy::print_stdout)]
fn extract(config: &AppConfig, json: bool) -> Result<()> {
    let paragraphs = extract_paragraphs(config)?;
    for paragraph in &paragraphs {
        if json {
            println!("{}", serde_json::to_string(paragraph)?);
        } else {
            println!(
                "[page {} block {}] {}\n",
                paragraph.page_index, paragraph.block_index, paragraph.text
            );
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn summarize(
    config: &AppConfig,
    size: NonZeroUsize,
    words: usize,
    width: NonZeroUsize,
) -> Result<()> {
    let paragraphs = extract_paragraphs(config)?;
    let model = create_chat_model(&config.llm)?;
    let processor = LanguageProcessor::new(LlmClient::new(model), config.target_lang.clone());

    let banner = "=".repeat(15);
    let runs = sections(&paragraphs, size);
    let leftover = runs.remainder().len();
    for section in runs {
        let Some(summary) = SectionSummary::summarize(&processor, section, words)
            .await
            .context("Failed to summarize section")?
        else {
            continue;
        };
        println!("{banner} {} {banner}", summary.title());
        for line in wrap_chars(&summary.text, width) {
            println!("{line}");
        }
    }

    if leftover > 0 {
        info!("{} trailing paragraphs do not fill a section of {}", leftover, size);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn preprocess(config: AppConfig) -> Result<()> {
    let mut reader = open_reader(config)?;
    let total = reader.cache().page_range().count();

    let pb = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let progress = pb.clone();
    let report = reader
        .preprocess(Some(Box::new(move |done, _total| {
            progress.set_position(u64::try_from(done).unwrap_or(u64::MAX));
        })))
        .await
        .context("Preprocessing stopped; rerun to resume from the last saved page")?;

    pb.finish_with_message("Preprocessing complete");

    println!(
        "Processed {} pages, {} already done or empty. Snapshot: {}",
        report.processed,
        report.skipped,
        reader.config().document.snapshot_path.display()
    );
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn show(
    config: AppConfig,
    page: usize,
    translate: bool,
    summary: Option<usize>,
) -> Result<()> {
    let mut reader = open_reader(config)?;
    if !reader.cache().page_range().contains(&page) {
        anyhow::bail!(
            "Page {} is outside the book range {}-{}",
            page,
            reader.cache().first_page(),
            reader.cache().last_page()
        );
    }

    if translate {
        reader
            .translate_page(page)
            .await
            .with_context(|| format!("Failed to translate page {page}"))?;
    }
    let summary = match summary {
        Some(words) => Some((
            words,
            reader
                .summarize_page(page, words)
                .await
                .with_context(|| format!("Failed to summarize page {page}"))?,
        )),
        None => None,
    };

    print!("{}", interactive::render_page(reader.cache(), page)?);
    // Fixed budgets are stored and already rendered with the page
    if let Some((words, text)) = summary.filter(|(w, _)| !SUMMARY_LENGTHS.contains(w)) {
        println!("--- {words}-word summary ---\n{text}");
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn list_models(config: &AppConfig) {
    println!(
        "Configured: {} ({:?} at {})",
        config.llm.model, config.llm.backend, config.llm.api_base
    );
    println!("Suggested:");
    for model in suggested_models() {
        println!("  {model}");
    }
    println!(
        "Summary lengths: {}",
        SUMMARY_LENGTHS.map(|w| w.to_string()).join(", ")
    );
}
