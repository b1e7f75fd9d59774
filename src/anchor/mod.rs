//! Anchor map: bidirectional index between character offsets and pages
//!
//! One anchor map corresponds to exactly one pagination run. It is
//! immutable once built and is shared behind `Arc` across threads and
//! cached per layout key.

use crate::document::{Chapter, Document};
use crate::layout::{paginate, paginate_with_cancel, LayoutKey, LayoutParameters, Measurer, Page};
use std::ops::Range;

/// Offset-to-page index for one pagination run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorMap {
    document_id: String,
    text_len: usize,
    layout_key: LayoutKey,
    pages: Vec<Page>,
}

impl AnchorMap {
    /// Paginate a document and build its anchor map
    pub fn build(document: &Document, params: &LayoutParameters, measurer: &Measurer) -> Self {
        let pages = paginate(document.text(), params, measurer);
        Self {
            document_id: document.id().to_string(),
            text_len: document.len(),
            layout_key: params.key(),
            pages,
        }
    }

    /// Cancellable build used by reflow workers
    pub fn build_with_cancel(
        document: &Document,
        params: &LayoutParameters,
        measurer: &Measurer,
        cancelled: &dyn Fn() -> bool,
    ) -> Option<Self> {
        let pages = paginate_with_cancel(document.text(), params, measurer, cancelled)?;
        Some(Self {
            document_id: document.id().to_string(),
            text_len: document.len(),
            layout_key: params.key(),
            pages,
        })
    }

    /// Identifier of the document this map was built from
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Length of the text this map was built from
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Layout identity of the run
    pub fn layout_key(&self) -> LayoutKey {
        self.layout_key
    }

    /// Total pages in the run (always at least 1)
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    /// All pages of the run in order
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Find the page containing an offset.
    ///
    /// Total over `[0, text_len]`: the end offset maps to the last page,
    /// and out-of-range offsets clamp to it as well.
    pub fn page_for_offset(&self, offset: usize) -> usize {
        self.pages
            .partition_point(|p| p.range.start <= offset)
            .max(1)
    }

    /// Get the byte range of a page
    pub fn range_for_page(&self, number: usize) -> Option<Range<usize>> {
        self.pages.get(number.checked_sub(1)?).map(|p| p.range.clone())
    }

    /// Get the text slice of a page
    pub fn page_text(&self, number: usize) -> Option<&str> {
        self.pages
            .get(number.checked_sub(1)?)
            .map(|p| p.text.as_str())
    }

    /// Derive a chapter's page range `[start_page, end_page)` for this run
    pub fn chapter_pages(&self, chapter: &Chapter) -> Range<usize> {
        let start_page = self.page_for_offset(chapter.range.start);
        if chapter.range.is_empty() {
            return start_page..start_page;
        }
        let end_page = self.page_for_offset(chapter.range.end - 1);
        start_page..end_page + 1
    }

    /// Panic if this map does not belong to `document`.
    ///
    /// Resolving offsets against a map from another document is a
    /// programming error, not a recoverable state.
    pub fn assert_matches(&self, document: &Document) {
        assert!(
            self.document_id == document.id() && self.text_len == document.len(),
            "anchor map built for document {:?} ({} bytes) used with {:?} ({} bytes)",
            self.document_id,
            self.text_len,
            document.id(),
            document.len(),
        );
    }
}
