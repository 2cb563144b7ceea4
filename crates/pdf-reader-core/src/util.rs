//! Utility functions shared across the crate.

use once_cell::sync::Lazy;
use regex::Regex;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Get the user's config directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

#[allow(clippy::expect_used)] // literal pattern
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Replace every run of whitespace with a single space.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}

/// Remove line breaks from model output.
pub fn strip_newlines(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}

/// Cut `text` into lines of at most `width` characters.
///
/// Counts characters rather than display columns and ignores word
/// boundaries, so it suits CJK text as well as Latin.
pub fn wrap_chars(text: &str, width: NonZeroUsize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width.get())
        .map(|line| line.iter().collect())
        .collect()
}
