//! Chapter metadata delivered by the document-parsing collaborator

use std::ops::Range;

/// A contiguous chapter of the book text
///
/// The byte range is fixed at import time. Page ranges are *not* stored
/// here: they depend on one specific pagination run and are derived from
/// the current anchor map instead (see `AnchorMap::chapter_pages`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Display title
    pub title: String,
    /// Half-open byte range within the document text
    pub range: Range<usize>,
    /// Optional rich markup from the parsing collaborator, passed through
    pub markup: Option<String>,
}

impl Chapter {
    /// Create a new chapter covering a byte range
    pub fn new(title: impl Into<String>, range: Range<usize>) -> Self {
        Self {
            title: title.into(),
            range,
            markup: None,
        }
    }

    /// Attach rich markup
    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = Some(markup.into());
        self
    }

    /// Check if this chapter contains a given offset
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.range.contains(&offset)
    }

    /// Get the chapter length in bytes
    pub fn byte_len(&self) -> usize {
        self.range.end - self.range.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_offset() {
        let chapter = Chapter::new("One", 10..50);

        assert!(!chapter.contains_offset(9));
        assert!(chapter.contains_offset(10));
        assert!(chapter.contains_offset(49));
        assert!(!chapter.contains_offset(50));
    }

    #[test]
    fn test_byte_len() {
        assert_eq!(Chapter::new("One", 10..50).byte_len(), 40);
        assert_eq!(Chapter::new("Empty", 5..5).byte_len(), 0);
    }
}
