//! Paragraph segmentation.
//!
//! Layout engines split running text into blocks that rarely match real
//! paragraphs: a sentence broken by a page turn or a figure ends up in two
//! blocks. Segmentation glues consecutive blocks together until the text
//! ends with a full stop.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::pdf::FragmentSource;

/// A sentence-terminated run of text.
///
/// `page_index` and `block_index` locate the first fragment the paragraph
/// was built from, even when it continues onto later pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub page_index: usize,
    pub block_index: usize,
    pub text: String,
}

/// Characters kept by the Latin filter besides ASCII letters and digits.
const ALLOWED_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '(', ')', '{', '}', '[', ']', '\'', '"', '-', '—', '’', ' ',
];

/// Whether `c` belongs to the Latin text class.
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ALLOWED_PUNCTUATION.contains(&c)
}

/// Turn one raw fragment into the text that joins a paragraph.
///
/// Line breaks and tabs become spaces, the Latin filter drops everything
/// else outside the allowed class when `latin_only` is set, and the result
/// is trimmed.
pub fn clean_fragment(raw: &str, latin_only: bool) -> String {
    let spaced = raw.chars().map(|c| if c.is_whitespace() { ' ' } else { c });
    let cleaned: String = if latin_only {
        spaced.filter(|&c| is_allowed_char(c)).collect()
    } else {
        spaced.collect()
    };
    cleaned.trim().to_string()
}

/// Incremental paragraph builder.
///
/// Feed it fragments in document order; it hands back a [`Paragraph`]
/// every time the accumulated text ends with `.`.
#[derive(Debug, Default)]
pub struct ParagraphAccumulator {
    text: String,
    origin: Option<(usize, usize)>,
    latin_only: bool,
}

impl ParagraphAccumulator {
    pub fn new(latin_only: bool) -> Self {
        Self {
            latin_only,
            ..Default::default()
        }
    }

    /// Add one raw fragment located at `(page, block)`.
    pub fn push(&mut self, page: usize, block: usize, raw: &str) -> Option<Paragraph> {
        let fragment = clean_fragment(raw, self.latin_only);
        if fragment.is_empty() {
            return None;
        }

        if self.text.is_empty() {
            self.origin = Some((page, block));
        } else {
            self.text.push(' ');
        }
        self.text.push_str(&fragment);

        if !self.text.ends_with('.') {
            return None;
        }

        let (page_index, block_index) = self.origin.take().unwrap_or((page, block));
        Some(Paragraph {
            page_index,
            block_index,
            text: std::mem::take(&mut self.text),
        })
    }

    /// Text accumulated since the last emitted paragraph.
    pub fn pending(&self) -> &str {
        &self.text
    }

    /// Consume the accumulator, returning the unterminated tail if any.
    ///
    /// The tail never ends with `.`, so it is not a [`Paragraph`].
    pub fn finish(self) -> Option<String> {
        if self.text.is_empty() { None } else { Some(self.text) }
    }
}

/// Walks a page range and produces its paragraphs.
#[derive(Debug, Clone, Copy)]
pub struct ParagraphExtractor {
    pub latin_only: bool,
}

impl Default for ParagraphExtractor {
    fn default() -> Self {
        Self { latin_only: true }
    }
}

impl ParagraphExtractor {
    pub const fn new(latin_only: bool) -> Self {
        Self { latin_only }
    }

    /// Extract all paragraphs of `pages`, in document order.
    ///
    /// Block indices count every raw fragment of the page, including the
    /// ones the filter empties. A paragraph still open when the range ends
    /// is dropped and logged.
    pub fn extract<S>(&self, source: &S, pages: RangeInclusive<usize>) -> Result<Vec<Paragraph>>
    where
        S: FragmentSource + ?Sized,
    {
        let mut acc = ParagraphAccumulator::new(self.latin_only);
        let mut paragraphs = Vec::new();

        for page in pages.clone() {
            let fragments = source.page_fragments(page)?;
            let before = paragraphs.len();
            for (block, raw) in fragments.iter().enumerate() {
                if let Some(paragraph) = acc.push(page, block, raw) {
                    paragraphs.push(paragraph);
                }
            }
            debug!(
                "Page {}: {} fragments, {} paragraphs completed",
                page,
                fragments.len(),
                paragraphs.len() - before
            );
        }

        if let Some(tail) = acc.finish() {
            warn!(
                "Dropping unterminated paragraph at end of pages {}-{} ({} chars)",
                pages.start(),
                pages.end(),
                tail.len()
            );
        }

        Ok(paragraphs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pages(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|page| page.iter().map(|s| (*s).to_string()).collect())
            .collect()
    }

    #[test]
    fn test_clean_fragment_filters_non_latin() {
        assert_eq!(clean_fragment("  浪潮 The wave — is coming’s.  ", true), "The wave — is coming’s.");
        assert_eq!(clean_fragment("第一章", true), "");
        assert_eq!(clean_fragment("line one\nline two", true), "line one line two");
    }

    #[test]
    fn test_clean_fragment_unfiltered_keeps_everything() {
        assert_eq!(clean_fragment(" 浪潮\n来了。 ", false), "浪潮 来了。");
    }

    #[test]
    fn test_filtered_text_only_contains_allowed_chars() {
        let raw = "Mixed: résumé, naïve café, 数据 & AI → $100 [note].";
        let cleaned = clean_fragment(raw, true);
        assert!(cleaned.chars().all(is_allowed_char));
        assert!(cleaned.contains("[note]."));
    }

    #[test]
    fn test_accumulator_joins_until_period() {
        let mut acc = ParagraphAccumulator::new(true);
        assert!(acc.push(3, 0, "The wave").is_none());
        assert_eq!(acc.pending(), "The wave");
        let paragraph = acc.push(3, 1, "is coming.").unwrap();
        assert_eq!(
            paragraph,
            Paragraph { page_index: 3, block_index: 0, text: "The wave is coming.".to_string() }
        );
        assert!(acc.finish().is_none());
    }

    #[test]
    fn test_accumulator_skips_empty_fragments() {
        let mut acc = ParagraphAccumulator::new(true);
        assert!(acc.push(0, 0, "  \n ").is_none());
        assert!(acc.push(0, 1, "中文").is_none());
        assert!(acc.pending().is_empty());
        let paragraph = acc.push(0, 2, "Start.").unwrap();
        assert_eq!(paragraph.block_index, 2);
    }

    #[test]
    fn test_paragraph_spanning_pages_keeps_first_location() {
        let source = pages(&[&["12", "Technology is"], &["a wave.", "Next one."]]);
        let paragraphs = ParagraphExtractor::default().extract(&source, 0..=1).unwrap();

        assert_eq!(paragraphs.len(), 2);
        // "12" is its own fragment with no period, so it opens the paragraph
        assert_eq!(paragraphs[0].text, "12 Technology is a wave.");
        assert_eq!((paragraphs[0].page_index, paragraphs[0].block_index), (0, 0));
        assert_eq!((paragraphs[1].page_index, paragraphs[1].block_index), (1, 1));
    }

    #[test]
    fn test_discarded_fragments_still_advance_block_index() {
        let source = pages(&[&["图一", "", "Only this."]]);
        let paragraphs = ParagraphExtractor::default().extract(&source, 0..=0).unwrap();
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].block_index, 2);
    }

    #[test]
    fn test_every_paragraph_ends_with_period_and_tail_is_dropped() {
        let source = pages(&[&["One.", "Two", "parts.", "Dangling"]]);
        let paragraphs = ParagraphExtractor::default().extract(&source, 0..=0).unwrap();
        let texts: Vec<_> = paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, ["One.", "Two parts."]);
        assert!(paragraphs.iter().all(|p| p.text.ends_with('.')));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let source = pages(&[&["A b.", "C"], &["d.", "E."]]);
        let extractor = ParagraphExtractor::default();
        assert_eq!(
            extractor.extract(&source, 0..=1).unwrap(),
            extractor.extract(&source, 0..=1).unwrap()
        );
    }

    #[test]
    fn test_page_out_of_range_is_an_error() {
        let source = pages(&[&["A."]]);
        assert!(ParagraphExtractor::default().extract(&source, 0..=3).is_err());
    }
}
