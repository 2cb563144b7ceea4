//! Per-page paragraphs, translations and summaries of one book.
//!
//! The cache is built once from the PDF and then only ever filled in:
//! translations and summaries are written when missing and never redone.
//! It lives on disk as a single JSON snapshot that is loaded or rebuilt as
//! a whole.

mod snapshot;

use std::ops::{Index, RangeInclusive};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{DocumentConfig, SUMMARY_LENGTHS};
use crate::error::{Error, Result};
use crate::paragraph::ParagraphExtractor;
use crate::pdf::FragmentSource;
use crate::processor::LanguageProcessor;
use snapshot::Snapshot;

/// Everything known about one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRecord {
    /// Source-language paragraphs starting on this page
    pub paragraphs: Vec<String>,
    /// Translations, parallel to `paragraphs` once the page is translated
    pub translations: Vec<String>,
    /// Summaries in [`SUMMARY_LENGTHS`] order; empty until computed
    pub summaries: [String; 3],
}

impl PageRecord {
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn is_translated(&self) -> bool {
        self.translations.len() == self.paragraphs.len()
    }

    pub fn is_summarized(&self) -> bool {
        self.is_empty() || self.summaries.iter().all(|s| !s.is_empty())
    }

    /// Nothing left to ask the model for
    pub fn is_processed(&self) -> bool {
        self.is_translated() && self.is_summarized()
    }

    /// Summary with the given word budget, if that budget exists and was computed
    pub fn summary(&self, words: usize) -> Option<&str> {
        let slot = SUMMARY_LENGTHS.iter().position(|&w| w == words)?;
        Some(self.summaries[slot].as_str()).filter(|s| !s.is_empty())
    }
}

/// Outcome of a [`DocumentCache::preprocess`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreprocessReport {
    /// Pages that needed model calls
    pub processed: usize,
    /// Pages that were empty or already complete
    pub skipped: usize,
}

/// Page records indexed by page number.
///
/// Sized to `last_page + 1` so page numbers index it directly; only
/// `[first_page, last_page]` ever holds content.
#[derive(Debug, Clone)]
pub struct DocumentCache {
    pages: Vec<PageRecord>,
    first_page: usize,
    last_page: usize,
    snapshot_path: Option<PathBuf>,
}

impl DocumentCache {
    /// An empty cache for `[first_page, last_page]`; `last_page` must
    /// already be known to lie inside the document.
    fn new(first_page: usize, last_page: usize) -> Self {
        Self {
            pages: vec![PageRecord::default(); last_page + 1],
            first_page,
            last_page,
            snapshot_path: None,
        }
    }

    /// Build the paragraph arrays from a document; nothing is translated yet.
    ///
    /// A `last_page` past the end of the document is rejected with
    /// [`Error::PdfInvalidPage`] before anything is extracted or allocated.
    pub fn setup<S>(
        source: &S,
        extractor: &ParagraphExtractor,
        first_page: usize,
        last_page: usize,
    ) -> Result<Self>
    where
        S: FragmentSource + ?Sized,
    {
        let total = source.page_count();
        if last_page >= total {
            return Err(Error::PdfInvalidPage {
                page: last_page,
                total,
            });
        }

        let paragraphs = extractor.extract(source, first_page..=last_page)?;
        let count = paragraphs.len();
        let mut cache = Self::new(first_page, last_page);

        for paragraph in paragraphs {
            cache.pages[paragraph.page_index].paragraphs.push(paragraph.text);
        }

        info!(
            "Extracted {} paragraphs from pages {}-{}",
            count, first_page, last_page
        );
        Ok(cache)
    }

    /// Adopt a snapshot as-is.
    ///
    /// The five arrays must agree with each other; whether they cover
    /// `[first_page, last_page]` is not checked beyond a warning. A range
    /// reaching past the stored pages is cut back to the last stored page.
    pub fn load(path: impl AsRef<Path>, first_page: usize, last_page: usize) -> Result<Self> {
        let path = path.as_ref();
        let pages = Snapshot::read(path)?.into_pages()?;

        if last_page.checked_add(1) != Some(pages.len()) {
            warn!(
                "Snapshot {} holds {} pages, expected pages {}-{}",
                path.display(),
                pages.len(),
                first_page,
                last_page
            );
        }
        let stored_last = pages.len().saturating_sub(1);
        let last_page = last_page.min(stored_last);
        let first_page = first_page.min(last_page);

        info!("Loaded snapshot {} ({} pages)", path.display(), pages.len());
        Ok(Self {
            pages,
            first_page,
            last_page,
            snapshot_path: Some(path.to_path_buf()),
        })
    }

    /// Load the configured snapshot, or build the cache from the document
    /// and write a first snapshot.
    ///
    /// `open_source` only runs when there is no snapshot, so an existing
    /// snapshot works even without the PDF.
    pub fn open<S, F>(config: &DocumentConfig, open_source: F) -> Result<Self>
    where
        S: FragmentSource,
        F: FnOnce() -> Result<S>,
    {
        let path = &config.snapshot_path;
        if path.exists() {
            return Self::load(path, config.first_page, config.last_page);
        }

        debug!("No snapshot at {}, extracting paragraphs", path.display());
        let source = open_source()?;
        let extractor = ParagraphExtractor::new(config.latin_only);
        let mut cache = Self::setup(&source, &extractor, config.first_page, config.last_page)?;
        cache.snapshot_path = Some(path.clone());
        cache.save()?;
        Ok(cache)
    }

    /// Write the whole cache to its snapshot path, if it has one.
    pub fn save(&self) -> Result<()> {
        match &self.snapshot_path {
            Some(path) => self.save_to(path),
            None => {
                debug!("Cache has no snapshot path, keeping it in memory");
                Ok(())
            }
        }
    }

    /// Write the whole cache to `path`.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        Snapshot::from_pages(&self.pages).write(path.as_ref())
    }

    /// Translate and summarize every page that still needs it.
    ///
    /// Paragraphs are translated one request at a time; the three summaries
    /// are computed from the source-language paragraphs and only for pages
    /// that have some. The snapshot is saved after each page, so an
    /// interrupted run picks up at the first unfinished page.
    pub async fn preprocess(
        &mut self,
        processor: &LanguageProcessor,
        progress_callback: Option<Box<dyn Fn(usize, usize) + Send>>,
    ) -> Result<PreprocessReport> {
        let total = self.page_range().count();
        let mut report = PreprocessReport::default();

        for (done, page) in self.page_range().enumerate() {
            if self.fill_page(page, processor).await? {
                self.save()?;
                report.processed += 1;
            } else {
                report.skipped += 1;
            }

            if let Some(ref callback) = progress_callback {
                callback(done + 1, total);
            }
        }

        info!(
            "Preprocessing finished: {} pages processed, {} skipped",
            report.processed, report.skipped
        );
        Ok(report)
    }

    /// Compute whatever page `page` is missing. Returns whether anything was asked of the model.
    pub(crate) async fn fill_page(&mut self, page: usize, processor: &LanguageProcessor) -> Result<bool> {
        let Some(record) = self.pages.get(page) else {
            warn!("Page {} is not in the cache", page);
            return Ok(false);
        };
        if record.is_processed() {
            return Ok(false);
        }

        let paragraphs = record.paragraphs.clone();
        debug!("Processing page {} ({} paragraphs)", page, paragraphs.len());

        if !record.is_translated() {
            let mut translations = Vec::with_capacity(paragraphs.len());
            for paragraph in &paragraphs {
                translations.push(processor.translate(paragraph).await?);
            }
            self.pages[page].translations = translations;
        }

        if !paragraphs.is_empty() {
            for (slot, words) in SUMMARY_LENGTHS.into_iter().enumerate() {
                if self.pages[page].summaries[slot].is_empty() {
                    let summary = processor.summarize(&paragraphs, words).await?;
                    self.pages[page].summaries[slot] = summary;
                }
            }
        }

        Ok(true)
    }

    /// Whether page `page` has no paragraphs (pages outside the cache count as empty)
    pub fn is_empty_page(&self, page: usize) -> bool {
        self.pages.get(page).is_none_or(PageRecord::is_empty)
    }

    pub fn page(&self, page: usize) -> Option<&PageRecord> {
        self.pages.get(page)
    }

    pub(crate) fn page_mut(&mut self, page: usize) -> Option<&mut PageRecord> {
        self.pages.get_mut(page)
    }

    /// Paragraphs of `page`, empty when the page is unknown
    pub fn paragraphs(&self, page: usize) -> &[String] {
        self.pages
            .get(page)
            .map(|p| p.paragraphs.as_slice())
            .unwrap_or_default()
    }

    pub const fn first_page(&self) -> usize {
        self.first_page
    }

    pub const fn last_page(&self) -> usize {
        self.last_page
    }

    pub const fn page_range(&self) -> RangeInclusive<usize> {
        self.first_page..=self.last_page
    }

    /// Number of stored page records
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    pub fn set_snapshot_path(&mut self, path: impl Into<PathBuf>) {
        self.snapshot_path = Some(path.into());
    }
}

/// Unchecked access for callers that stay inside [`DocumentCache::len`].
///
/// # Panics
///
/// Panics if `page` is not a stored page; use [`DocumentCache::page`] for
/// checked access.
impl Index<usize> for DocumentCache {
    type Output = PageRecord;

    fn index(&self, page: usize) -> &PageRecord {
        &self.pages[page]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn source() -> Vec<Vec<String>> {
        let pages: [&[&str]; 5] = [
            &["Front matter."],
            &["The wave", "is coming."],
            &[],
            &["Containment is", "中文"],
            &["not possible.", "Or is it."],
        ];
        pages
            .iter()
            .map(|p| p.iter().map(|s| (*s).to_string()).collect())
            .collect()
    }

    #[test]
    fn test_setup_fills_only_paragraphs_in_range() {
        let cache = DocumentCache::setup(&source(), &ParagraphExtractor::default(), 1, 4).unwrap();

        assert_eq!(cache.len(), 5);
        assert!(cache.is_empty_page(0), "page before the range is never read");
        assert_eq!(cache.paragraphs(1), ["The wave is coming."]);
        assert!(cache.is_empty_page(2));
        // Paragraph starting on page 3 and ending on page 4 belongs to page 3
        assert_eq!(cache.paragraphs(3), ["Containment is not possible."]);
        assert_eq!(cache.paragraphs(4), ["Or is it."]);
        let record = cache.page(1).unwrap();
        assert!(record.translations.is_empty());
        assert!(record.summaries.iter().all(String::is_empty));
    }

    #[test]
    fn test_is_empty_page_matches_paragraph_count() {
        let cache = DocumentCache::setup(&source(), &ParagraphExtractor::default(), 1, 4).unwrap();
        for page in 0..cache.len() + 2 {
            assert_eq!(cache.is_empty_page(page), cache.paragraphs(page).is_empty());
        }
    }

    #[test]
    fn test_page_record_states() {
        let mut record = PageRecord::default();
        assert!(record.is_processed(), "an empty page needs nothing");

        record.paragraphs.push("A.".to_string());
        assert!(!record.is_translated());
        assert!(!record.is_summarized());

        record.translations.push("甲。".to_string());
        record.summaries = ["x".to_string(), "y".to_string(), "z".to_string()];
        assert!(record.is_processed());
        assert_eq!(record.summary(200), Some("y"));
        assert_eq!(record.summary(150), None);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("document_text.json");

        let mut cache = DocumentCache::setup(&source(), &ParagraphExtractor::default(), 1, 4).unwrap();
        cache.page_mut(1).unwrap().translations = vec!["浪潮即将到来。".to_string()];
        cache.save_to(&path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = DocumentCache::load(&path, 1, 4).unwrap();
        assert_eq!(loaded.len(), cache.len());
        for page in 0..cache.len() {
            assert_eq!(loaded.page(page), cache.page(page));
        }
        assert_eq!(loaded.snapshot_path(), Some(path.as_path()));
    }

    #[test]
    fn test_open_prefers_snapshot_over_document() {
        let dir = tempfile::tempdir().unwrap();
        let config = DocumentConfig {
            snapshot_path: dir.path().join("document_text.json"),
            first_page: 1,
            last_page: 4,
            ..DocumentConfig::default()
        };

        let built = DocumentCache::open(&config, || Ok(source())).unwrap();
        assert!(config.snapshot_path.exists(), "first open writes a snapshot");

        let reopened = DocumentCache::open(&config, || -> Result<Vec<Vec<String>>> {
            Err(crate::error::Error::PdfOpen("document must not be read".to_string()))
        })
        .unwrap();
        assert_eq!(reopened.paragraphs(3), built.paragraphs(3));
    }

    #[test]
    fn test_setup_rejects_range_past_the_document() {
        for last in [5, 1 << 40, usize::MAX] {
            let result = DocumentCache::setup(&source(), &ParagraphExtractor::default(), 1, last);
            assert!(
                matches!(result, Err(Error::PdfInvalidPage { page, total: 5 }) if page == last),
                "last page {last} should be rejected"
            );
        }
    }

    #[test]
    fn test_load_cuts_range_back_to_stored_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("document_text.json");
        let cache = DocumentCache::setup(&source(), &ParagraphExtractor::default(), 1, 4).unwrap();
        cache.save_to(&path).unwrap();

        let loaded = DocumentCache::load(&path, 1, usize::MAX).unwrap();
        assert_eq!(loaded.len(), 5);
        assert_eq!(loaded.page_range(), 1..=4);
        assert_eq!(loaded.paragraphs(4), ["Or is it."]);

        let loaded = DocumentCache::load(&path, 1 << 40, 1 << 41).unwrap();
        assert_eq!(loaded.page_range(), 4..=4);
    }

    #[test]
    fn test_index_matches_checked_access() {
        let cache = DocumentCache::setup(&source(), &ParagraphExtractor::default(), 1, 4).unwrap();
        assert_eq!(Some(&cache[3]), cache.page(3));
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn test_index_past_stored_pages_panics() {
        let cache = DocumentCache::setup(&source(), &ParagraphExtractor::default(), 1, 4).unwrap();
        let _ = &cache[5];
    }

    #[test]
    fn test_load_missing_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DocumentCache::load(dir.path().join("absent.json"), 1, 4);
        assert!(matches!(result, Err(crate::error::Error::SnapshotRead { .. })));
    }
}
