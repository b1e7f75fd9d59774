//! Durable reading positions and bookmarks
//!
//! Progress is stored as a character anchor, never a bare page number, so
//! it stays meaningful after any reflow. Records here are what the
//! persistence collaborator serializes and hands back on load.

use crate::anchor::AnchorMap;
use crate::layout::LayoutKey;
use serde::{Deserialize, Serialize};

/// A durable position in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingPosition {
    /// Document this position belongs to
    pub document_id: String,
    /// Byte anchor into the original text
    pub anchor: usize,
    /// Layout identity at capture time; informational only, resolution
    /// always goes through the current anchor map
    pub layout_key: LayoutKey,
    /// Capture timestamp in milliseconds, supplied by the caller
    pub captured_at_ms: u64,
}

impl ReadingPosition {
    /// Capture the position at the start of a page.
    ///
    /// Returns `None` for a page number outside the run.
    pub fn capture(page: usize, map: &AnchorMap, captured_at_ms: u64) -> Option<Self> {
        let range = map.range_for_page(page)?;
        Some(Self {
            document_id: map.document_id().to_string(),
            anchor: range.start,
            layout_key: map.layout_key(),
            captured_at_ms,
        })
    }

    /// Resolve this position to a page number under the current map.
    ///
    /// Works regardless of whether layout parameters changed since
    /// capture; that is what makes progress survive font and margin
    /// changes. An anchor past the current text length clamps to the last
    /// page. Resolving against a map from another document panics: that
    /// is an invariant violation, not a recoverable state.
    pub fn resolve(&self, map: &AnchorMap) -> usize {
        assert!(
            self.document_id == map.document_id(),
            "reading position for document {:?} resolved against map for {:?}",
            self.document_id,
            map.document_id(),
        );
        map.page_for_offset(self.anchor.min(map.text_len()))
    }

    /// Whether the position was captured under the given layout identity
    pub fn captured_under(&self, key: LayoutKey) -> bool {
        self.layout_key == key
    }
}

/// A saved place with an optional note; independent of reading progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub position: ReadingPosition,
    /// Free-form reader note
    pub note: Option<String>,
    /// Chapter index at creation time, for display
    pub chapter: Option<usize>,
}

impl Bookmark {
    /// Create a bookmark at a position
    pub fn new(position: ReadingPosition) -> Self {
        Self {
            position,
            note: None,
            chapter: None,
        }
    }

    /// Attach a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Attach a chapter reference
    pub fn with_chapter(mut self, chapter: usize) -> Self {
        self.chapter = Some(chapter);
        self
    }
}
