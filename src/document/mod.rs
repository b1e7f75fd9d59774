//! Document model for an imported book
//!
//! The text is delivered once by the parsing collaborator and is immutable
//! for the life of the document, so it can be shared freely across
//! pagination runs and worker threads.

mod chapter;
mod paragraph;

pub use chapter::Chapter;
pub use paragraph::{ParagraphId, ParagraphIndex};

use std::ops::Range;
use std::sync::Arc;

/// An imported book: identifier, immutable full text, chapter boundaries
#[derive(Debug, Clone)]
pub struct Document {
    id: String,
    text: Arc<str>,
    chapters: Vec<Chapter>,
    paragraph_index: ParagraphIndex,
}

impl Document {
    /// Create a document from parsed import data
    ///
    /// Chapters are expected in text order with in-bounds ranges, as the
    /// parsing collaborator delivers them.
    pub fn new(id: impl Into<String>, text: impl Into<String>, chapters: Vec<Chapter>) -> Self {
        let text: String = text.into();
        let paragraph_index = ParagraphIndex::from_text(&text);
        debug_assert!(chapters.iter().all(|c| c.range.end <= text.len()));

        Self {
            id: id.into(),
            text: text.into(),
            chapters,
            paragraph_index,
        }
    }

    /// Create a document without chapter structure
    pub fn from_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, text, Vec::new())
    }

    /// Get the document identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get total text length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the text is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Get the full text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get a slice of the text
    pub fn slice(&self, range: Range<usize>) -> &str {
        &self.text[range]
    }

    /// Get the chapter list
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Get a chapter by index
    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    /// Find the chapter containing an offset
    pub fn chapter_at_offset(&self, offset: usize) -> Option<(usize, &Chapter)> {
        self.chapters
            .iter()
            .enumerate()
            .find(|(_, c)| c.contains_offset(offset))
    }

    /// Get the paragraph index
    pub fn paragraphs(&self) -> &ParagraphIndex {
        &self.paragraph_index
    }
}
