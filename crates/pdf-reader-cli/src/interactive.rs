//! Line-oriented reading and chat sessions on stdin/stdout.

use anyhow::{Context, Result};
use pdf_reader_core::{DocumentCache, PageCursor, Reader, SUMMARY_LENGTHS};
use std::fmt::{self, Write as _};
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

const READ_HELP: &str = "\
Commands:
  n / p            next / previous page with text
  f / l            first / last page with text
  g <page>         go to a page (or the next one with text)
  t                translate the current page
  s [words]        summarize the current page (default 100 words)
  c <message>      chat with the model
  reset            forget the chat history
  h                show this help
  q                quit";

/// One page as text: paragraphs, their translations when present, then
/// whatever summaries are stored.
pub fn render_page(cache: &DocumentCache, page: usize) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "=== Page {page} ===")?;

    let Some(record) = cache.page(page) else {
        writeln!(out, "(no such page)")?;
        return Ok(out);
    };
    if record.is_empty() {
        writeln!(out, "(no text on this page)")?;
        return Ok(out);
    }

    for (i, paragraph) in record.paragraphs.iter().enumerate() {
        writeln!(out, "\n{paragraph}")?;
        if let Some(translation) = record.translations.get(i) {
            writeln!(out, "  > {translation}")?;
        }
    }

    for words in SUMMARY_LENGTHS {
        if let Some(summary) = record.summary(words) {
            writeln!(out, "\n--- {words}-word summary ---\n{summary}")?;
        }
    }
    Ok(out)
}

struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `prompt` and wait for a line; `None` on end of input.
    #[allow(clippy::print_stdout)]
    async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout().flush().context("Failed to flush stdout")?;
        let line = self.lines.next_line().await.context("Failed to read stdin")?;
        Ok(line.map(|l| l.trim().to_string()))
    }
}

/// Page through the book, translating and summarizing on demand.
#[allow(clippy::print_stdout)]
pub async fn read(mut reader: Reader, start: Option<usize>) -> Result<()> {
    let mut cursor = PageCursor::new(reader.cache());
    if let Some(page) = start {
        cursor.seek(reader.cache(), page);
        if cursor.current() < page {
            println!("No page with text at or after {page}");
        }
    }

    println!("{READ_HELP}\n");
    print!("{}", render_page(reader.cache(), cursor.current())?);

    let mut prompt = Prompt::new();
    while let Some(line) = prompt.ask("\n> ").await? {
        let (command, rest) = line.split_once(' ').unwrap_or((line.as_str(), ""));
        let rest = rest.trim();

        let moved = match command {
            "" => continue,
            "q" | "quit" => break,
            "h" | "help" => {
                println!("{READ_HELP}");
                continue;
            }
            "n" => cursor.next(reader.cache()),
            "p" => cursor.prev(reader.cache()),
            "f" => cursor.first(reader.cache()),
            "l" => cursor.last(reader.cache()),
            "g" => match rest.parse::<usize>() {
                Ok(page) => cursor.seek(reader.cache(), page),
                Err(_) => {
                    println!("Usage: g <page>");
                    continue;
                }
            },
            "t" => {
                let page = cursor.current();
                match reader.translate_page(page).await {
                    Ok(_) => print!("{}", render_page(reader.cache(), page)?),
                    Err(e) => warn!("Translation failed: {e}"),
                }
                continue;
            }
            "s" => {
                let words = if rest.is_empty() {
                    SUMMARY_LENGTHS[0]
                } else if let Ok(words) = rest.parse::<usize>() {
                    words
                } else {
                    println!("Usage: s [words]");
                    continue;
                };
                match reader.summarize_page(cursor.current(), words).await {
                    Ok(summary) if summary.is_empty() => println!("(nothing to summarize)"),
                    Ok(summary) => println!("--- {words}-word summary ---\n{summary}"),
                    Err(e) => warn!("Summary failed: {e}"),
                }
                continue;
            }
            "c" => {
                if rest.is_empty() {
                    println!("Usage: c <message>");
                } else {
                    match reader.chat(rest).await {
                        Ok(reply) => println!("{reply}"),
                        Err(e) => warn!("Chat failed: {e}"),
                    }
                }
                continue;
            }
            "reset" => {
                reader.processor_mut().reset_chat();
                println!("Chat history cleared");
                continue;
            }
            other => {
                println!("Unknown command '{other}', type h for help");
                continue;
            }
        };

        if moved {
            print!("{}", render_page(reader.cache(), cursor.current())?);
        } else {
            println!("(no other page with text that way)");
        }
    }
    Ok(())
}

/// Free conversation with the model until `/quit` or end of input.
#[allow(clippy::print_stdout)]
pub async fn chat(mut reader: Reader) -> Result<()> {
    let info = reader.model_info();
    println!(
        "Chatting with {} ({}). Type /reset to start over, /quit to leave.",
        info.model, info.backend
    );

    let mut prompt = Prompt::new();
    while let Some(line) = prompt.ask("\nyou> ").await? {
        match line.as_str() {
            "" => {}
            "/quit" | "/q" => break,
            "/reset" => {
                reader.processor_mut().reset_chat();
                println!("Chat history cleared");
            }
            message => match reader.chat(message).await {
                Ok(reply) => println!("{}> {reply}", info.model),
                Err(e) => warn!("Chat failed: {e}"),
            },
        }
    }
    Ok(())
}
