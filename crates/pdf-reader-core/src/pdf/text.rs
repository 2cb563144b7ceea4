use mupdf::{Document as MuDocument, TextPageOptions};
use tracing::trace;

use crate::error::{Error, Result};
use super::document::PdfDocument;

/// Anything that can list the raw text fragments of a page.
///
/// Fragments come back in reading order, one per layout block, untouched:
/// lines inside a block stay separated by `\n` and nothing is filtered.
pub trait FragmentSource {
    /// Number of pages the source holds
    fn page_count(&self) -> usize;

    /// Raw text blocks of one page (0-indexed)
    fn page_fragments(&self, page: usize) -> Result<Vec<String>>;
}

/// Reads text blocks out of a [`PdfDocument`] through mupdf.
///
/// The document is parsed once when the extractor is created and reused
/// for every page.
pub struct TextExtractor {
    doc: MuDocument,
    page_count: usize,
}

impl TextExtractor {
    pub fn new(pdf: &PdfDocument) -> Result<Self> {
        Ok(Self {
            doc: pdf.open_document()?,
            page_count: pdf.page_count(),
        })
    }

    fn page_index(&self, page: usize) -> Result<i32> {
        let invalid = || Error::PdfInvalidPage {
            page,
            total: self.page_count,
        };
        if page >= self.page_count {
            return Err(invalid());
        }
        i32::try_from(page).map_err(|_| invalid())
    }
}

impl FragmentSource for TextExtractor {
    fn page_count(&self) -> usize {
        self.page_count
    }

    /// One string per mupdf block, lines joined with `\n`.
    fn page_fragments(&self, page: usize) -> Result<Vec<String>> {
        let index = self.page_index(page)?;

        let mu_page = self.doc.load_page(index).map_err(|e| Error::PdfTextExtraction {
            page,
            reason: format!("Failed to load page: {e}"),
        })?;

        let text_page = mu_page
            .to_text_page(TextPageOptions::empty())
            .map_err(|e| Error::PdfTextExtraction {
                page,
                reason: format!("Failed to get text page: {e}"),
            })?;

        let mut fragments = Vec::new();
        for block in text_page.blocks() {
            let mut block_text = String::new();
            for line in block.lines() {
                if !block_text.is_empty() {
                    block_text.push('\n');
                }
                block_text.extend(line.chars().filter_map(|c| c.char()));
            }
            fragments.push(block_text);
        }

        trace!("Page {} has {} blocks", page, fragments.len());
        Ok(fragments)
    }
}

/// Pages held in memory, one `Vec` of fragments per page.
///
/// Used where the text is already known, e.g. when replaying extraction
/// on captured fragments.
impl FragmentSource for [Vec<String>] {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_fragments(&self, page: usize) -> Result<Vec<String>> {
        self.get(page).cloned().ok_or(Error::PdfInvalidPage {
            page,
            total: self.len(),
        })
    }
}

impl FragmentSource for Vec<Vec<String>> {
    fn page_count(&self) -> usize {
        self.as_slice().page_count()
    }

    fn page_fragments(&self, page: usize) -> Result<Vec<String>> {
        self.as_slice().page_fragments(page)
    }
}
