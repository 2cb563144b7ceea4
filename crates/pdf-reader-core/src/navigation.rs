use crate::cache::DocumentCache;

/// Position of a reader in the cache.
///
/// Moves only between pages that have paragraphs and never leaves the
/// cache's page range. A move with nowhere to go leaves the cursor where it
/// was and returns `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    current: usize,
}

impl PageCursor {
    /// Cursor on the first page with content, or on the first page of the
    /// range if every page is empty.
    pub fn new(cache: &DocumentCache) -> Self {
        let current = cache
            .page_range()
            .find(|&p| !cache.is_empty_page(p))
            .unwrap_or_else(|| cache.first_page());
        Self { current }
    }

    pub const fn current(&self) -> usize {
        self.current
    }

    pub fn next(&mut self, cache: &DocumentCache) -> bool {
        let target = (self.current + 1..=cache.last_page()).find(|&p| !cache.is_empty_page(p));
        self.move_to(target)
    }

    pub fn prev(&mut self, cache: &DocumentCache) -> bool {
        let target = (cache.first_page()..self.current)
            .rev()
            .find(|&p| !cache.is_empty_page(p));
        self.move_to(target)
    }

    pub fn first(&mut self, cache: &DocumentCache) -> bool {
        let target = cache.page_range().find(|&p| !cache.is_empty_page(p));
        self.move_to(target)
    }

    pub fn last(&mut self, cache: &DocumentCache) -> bool {
        let target = cache.page_range().rev().find(|&p| !cache.is_empty_page(p));
        self.move_to(target)
    }

    /// Go to `page`, or to the next page with content after it.
    pub fn seek(&mut self, cache: &DocumentCache, page: usize) -> bool {
        let start = page.max(cache.first_page());
        let target = (start..=cache.last_page()).find(|&p| !cache.is_empty_page(p));
        self.move_to(target)
    }

    fn move_to(&mut self, target: Option<usize>) -> bool {
        match target {
            Some(page) if page != self.current => {
                self.current = page;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::paragraph::ParagraphExtractor;

    /// Pages 2..=8 where only 3, 4 and 7 have text.
    fn cache() -> DocumentCache {
        let mut pages: Vec<Vec<String>> = vec![Vec::new(); 9];
        pages[3] = vec!["Three.".to_string()];
        pages[4] = vec!["Four.".to_string()];
        pages[7] = vec!["Seven.".to_string()];
        DocumentCache::setup(&pages, &ParagraphExtractor::default(), 2, 8).unwrap()
    }

    #[test]
    fn test_starts_on_first_page_with_content() {
        assert_eq!(PageCursor::new(&cache()).current(), 3);
    }

    #[test]
    fn test_next_and_prev_skip_empty_pages() {
        let cache = cache();
        let mut cursor = PageCursor::new(&cache);

        assert!(cursor.next(&cache));
        assert_eq!(cursor.current(), 4);
        assert!(cursor.next(&cache));
        assert_eq!(cursor.current(), 7);
        assert!(!cursor.next(&cache), "nothing after page 7");
        assert_eq!(cursor.current(), 7);

        assert!(cursor.prev(&cache));
        assert_eq!(cursor.current(), 4);
        assert!(cursor.prev(&cache));
        assert!(!cursor.prev(&cache));
        assert_eq!(cursor.current(), 3);
    }

    #[test]
    fn test_first_last_and_seek() {
        let cache = cache();
        let mut cursor = PageCursor::new(&cache);

        assert!(cursor.last(&cache));
        assert_eq!(cursor.current(), 7);
        assert!(!cursor.last(&cache));
        assert!(cursor.first(&cache));
        assert_eq!(cursor.current(), 3);

        assert!(cursor.seek(&cache, 5));
        assert_eq!(cursor.current(), 7);
        assert!(!cursor.seek(&cache, 8), "no content at or after page 8");
        assert_eq!(cursor.current(), 7);
    }

    #[test]
    fn test_all_empty_range() {
        let pages: Vec<Vec<String>> = vec![Vec::new(); 4];
        let cache = DocumentCache::setup(&pages, &ParagraphExtractor::default(), 1, 3).unwrap();
        let mut cursor = PageCursor::new(&cache);
        assert_eq!(cursor.current(), 1);
        assert!(!cursor.next(&cache));
        assert!(!cursor.last(&cache));
    }
}
