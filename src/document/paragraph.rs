//! Paragraph indexing for fast offset lookups
//!
//! The book text is immutable, so the index is built once and paragraph
//! ordinals double as the correspondence unit with the translated rendition.

use std::ops::Range;

/// Ordinal of a paragraph within a document (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ParagraphId(pub usize);

/// Index structure for paragraph boundary lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphIndex {
    /// (start_offset, byte_len) per paragraph, in text order
    bounds: Vec<(usize, usize)>,
}

impl ParagraphIndex {
    /// Build the index from a full text, splitting on newlines.
    ///
    /// Always produces at least one paragraph so that every offset in
    /// `[0, len]` has a containing paragraph, including in the empty text.
    pub fn from_text(text: &str) -> Self {
        let mut bounds = Vec::new();
        let mut offset = 0;

        for para_text in text.split('\n') {
            bounds.push((offset, para_text.len()));
            offset += para_text.len() + 1; // +1 for the newline
        }

        if bounds.is_empty() {
            bounds.push((0, 0));
        }

        Self { bounds }
    }

    /// Get paragraph count
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// The index always holds at least one paragraph
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Get paragraph bounds as (start_offset, byte_len)
    pub fn bounds(&self, para_id: ParagraphId) -> Option<(usize, usize)> {
        self.bounds.get(para_id.0).copied()
    }

    /// Get the byte range of a paragraph, excluding its trailing newline
    pub fn range(&self, para_id: ParagraphId) -> Option<Range<usize>> {
        self.bounds(para_id).map(|(start, len)| start..start + len)
    }

    /// Find the paragraph containing an offset
    ///
    /// Total over `[0, len]`; offsets past the end clamp to the last
    /// paragraph.
    pub fn para_at_offset(&self, offset: usize) -> (ParagraphId, usize) {
        // Largest start offset <= target offset
        let idx = self
            .bounds
            .partition_point(|&(start, _)| start <= offset)
            .saturating_sub(1);
        let (start, _) = self.bounds[idx];
        (ParagraphId(idx), start)
    }

    /// Paragraph ordinals spanned by a byte range
    pub fn paras_in_range(&self, range: Range<usize>) -> Range<usize> {
        if range.is_empty() {
            let (first, _) = self.para_at_offset(range.start);
            return first.0..first.0;
        }
        let (first, _) = self.para_at_offset(range.start);
        let (last, _) = self.para_at_offset(range.end - 1);
        first.0..last.0 + 1
    }

    /// Iterate over paragraphs in order
    pub fn iter(&self) -> impl Iterator<Item = ParagraphId> + '_ {
        (0..self.bounds.len()).map(ParagraphId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text() {
        let index = ParagraphIndex::from_text("Hello\nWorld\nAgain");
        assert_eq!(index.len(), 3);
        assert_eq!(index.range(ParagraphId(0)), Some(0..5));
        assert_eq!(index.range(ParagraphId(1)), Some(6..11));
        assert_eq!(index.range(ParagraphId(2)), Some(12..17));
    }

    #[test]
    fn test_empty_text_has_one_paragraph() {
        let index = ParagraphIndex::from_text("");
        assert_eq!(index.len(), 1);
        assert_eq!(index.range(ParagraphId(0)), Some(0..0));
    }

    #[test]
    fn test_para_at_offset() {
        let index = ParagraphIndex::from_text("Hello\nWorld");

        assert_eq!(index.para_at_offset(0).0, ParagraphId(0));
        assert_eq!(index.para_at_offset(5).0, ParagraphId(0));
        assert_eq!(index.para_at_offset(6).0, ParagraphId(1));
        // Past the end clamps to the last paragraph
        assert_eq!(index.para_at_offset(100).0, ParagraphId(1));
    }

    #[test]
    fn test_paras_in_range() {
        let index = ParagraphIndex::from_text("Hello\nWorld\nAgain");

        assert_eq!(index.paras_in_range(0..5), 0..1);
        assert_eq!(index.paras_in_range(0..11), 0..2);
        assert_eq!(index.paras_in_range(3..14), 0..3);
        assert_eq!(index.paras_in_range(6..6), 1..1);
    }
}
