//! Rolling summaries over runs of consecutive paragraphs.
//!
//! Unlike the per-page summaries of the cache, a section ignores page
//! boundaries: it is a fixed number of paragraphs in document order, named
//! by where its first and last paragraph start.

use std::num::NonZeroUsize;
use std::slice::ChunksExact;

use tracing::debug;

use crate::error::Result;
use crate::paragraph::Paragraph;
use crate::processor::LanguageProcessor;

/// Runs of exactly `size` paragraphs, in order.
///
/// Paragraphs left over at the end that do not fill a run are not part of
/// any section; see [`ChunksExact::remainder`].
pub fn sections(paragraphs: &[Paragraph], size: NonZeroUsize) -> ChunksExact<'_, Paragraph> {
    paragraphs.chunks_exact(size.get())
}

/// Summary of one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSummary {
    /// `(page_index, block_index)` of the first paragraph
    pub start: (usize, usize),
    /// `(page_index, block_index)` of the last paragraph
    pub end: (usize, usize),
    pub text: String,
}

impl SectionSummary {
    /// Summarize `section` in about `words` words. `None` for an empty section.
    pub async fn summarize(
        processor: &LanguageProcessor,
        section: &[Paragraph],
        words: usize,
    ) -> Result<Option<Self>> {
        let (Some(first), Some(last)) = (section.first(), section.last()) else {
            return Ok(None);
        };

        debug!(
            "Summarizing section page {} block {} to page {} block {}",
            first.page_index, first.block_index, last.page_index, last.block_index
        );
        let texts: Vec<&str> = section.iter().map(|p| p.text.as_str()).collect();
        let text = processor.summarize(&texts, words).await?;

        Ok(Some(Self {
            start: (first.page_index, first.block_index),
            end: (last.page_index, last.block_index),
            text,
        }))
    }

    pub fn title(&self) -> String {
        format!(
            "summary from page {} block {} to page {} block {}",
            self.start.0, self.start.1, self.end.0, self.end.1
        )
    }
}
