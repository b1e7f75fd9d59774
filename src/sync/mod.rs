//! Dual-panel synchronization between the original and translated text
//!
//! Translation changes text length, so exact offset correspondence is
//! unavailable. The synchronizer leans on a coarser contract instead: the
//! translation collaborator preserves paragraph count and ordering, which
//! makes paragraph ordinals the common coordinate system between the two
//! renditions.

mod cache;

pub use cache::{MemoryTranslationCache, TranslationCache, TranslationStatus};

use crate::anchor::AnchorMap;
use crate::document::ParagraphIndex;
use smallvec::SmallVec;
use std::ops::Range;
use thiserror::Error;

/// Errors at the translation boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The collaborator violated the paragraph-preservation contract.
    /// Callers should re-segment the response and retry rather than let a
    /// skewed correspondence into the sync table.
    #[error("translated response has {got} paragraphs, original has {expected}")]
    ParagraphCountMismatch { expected: usize, got: usize },
    /// A paragraph ordinal outside the original document
    #[error("paragraph {0} out of range of {1} paragraphs")]
    ParagraphOutOfRange(usize, usize),
    /// No translated rendition has been attached to the session
    #[error("no translation attached")]
    NotAttached,
}

/// Order-preserving correspondence from original paragraph ordinals to
/// byte ranges of the translated text
///
/// `None` marks paragraphs whose translation has not resolved (or failed);
/// the sync table reports those pages as pending instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphCorrespondence {
    ranges: Vec<Option<Range<usize>>>,
}

impl ParagraphCorrespondence {
    /// Translated byte range of a paragraph, if resolved
    pub fn range(&self, paragraph: usize) -> Option<Range<usize>> {
        self.ranges.get(paragraph).cloned().flatten()
    }

    /// Paragraph count (same as the original document's)
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of resolved paragraphs
    pub fn resolved_count(&self) -> usize {
        self.ranges.iter().filter(|r| r.is_some()).count()
    }

    /// Resolved (ordinal, range) pairs in text order
    pub fn iter_resolved(&self) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        self.ranges
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.clone().map(|r| (i, r)))
    }
}

/// Per-paragraph state while translations trickle in
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Pending,
    Ready(String),
    Failed,
}

/// Accumulates per-paragraph translations as they resolve
///
/// Each paragraph resolves independently; `assemble` produces the partial
/// translated text plus the correspondence at any point, so the sync table
/// is rebuilt incrementally rather than all-or-nothing.
#[derive(Debug, Clone)]
pub struct TranslationAssembler {
    slots: Vec<Slot>,
}

impl TranslationAssembler {
    /// Create an assembler for a document with `paragraph_count` paragraphs
    pub fn new(paragraph_count: usize) -> Self {
        Self {
            slots: vec![Slot::Pending; paragraph_count],
        }
    }

    /// Paragraph count this assembler was sized for
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Record a resolved translation for one paragraph
    pub fn resolve(&mut self, paragraph: usize, text: impl Into<String>) -> Result<(), SyncError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(paragraph)
            .ok_or(SyncError::ParagraphOutOfRange(paragraph, len))?;
        *slot = Slot::Ready(text.into());
        Ok(())
    }

    /// Record a failed fetch for one paragraph; retriable via `resolve`
    pub fn mark_failed(&mut self, paragraph: usize) -> Result<(), SyncError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(paragraph)
            .ok_or(SyncError::ParagraphOutOfRange(paragraph, len))?;
        if !matches!(slot, Slot::Ready(_)) {
            *slot = Slot::Failed;
        }
        Ok(())
    }

    /// Whether any paragraph is marked failed
    pub fn has_failures(&self) -> bool {
        self.slots.iter().any(|s| matches!(s, Slot::Failed))
    }

    /// Whether every paragraph has resolved
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| matches!(s, Slot::Ready(_)))
    }

    /// Pull any paragraphs the cache already holds
    pub fn fill_from_cache<C: TranslationCache + ?Sized>(
        &mut self,
        cache: &C,
        document_id: &str,
        target_language: &str,
    ) {
        for paragraph in 0..self.slots.len() {
            if matches!(self.slots[paragraph], Slot::Ready(_)) {
                continue;
            }
            match cache.get(document_id, paragraph..paragraph + 1, target_language) {
                TranslationStatus::Ready(text) => self.slots[paragraph] = Slot::Ready(text),
                TranslationStatus::Failed => self.slots[paragraph] = Slot::Failed,
                TranslationStatus::Pending => {}
            }
        }
    }

    /// Assemble the translated text from the resolved paragraphs.
    ///
    /// Unresolved paragraphs are left out of the text and marked `None` in
    /// the correspondence; resolved paragraphs keep their original order.
    pub fn assemble(&self) -> (String, ParagraphCorrespondence) {
        let mut text = String::new();
        let mut ranges = vec![None; self.slots.len()];

        for (i, slot) in self.slots.iter().enumerate() {
            if let Slot::Ready(part) = slot {
                if !text.is_empty() {
                    text.push('\n');
                }
                let start = text.len();
                text.push_str(part);
                ranges[i] = Some(start..text.len());
            }
        }

        (text, ParagraphCorrespondence { ranges })
    }
}

/// A fully delivered translated rendition
///
/// The batch entry point for collaborators that translate a document in
/// one shot. Enforces the paragraph-preservation contract up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedText {
    text: String,
    correspondence: ParagraphCorrespondence,
}

impl TranslatedText {
    /// Build from one translated string per original paragraph.
    ///
    /// Rejects responses whose paragraph count differs from the
    /// original's instead of producing a skewed correspondence.
    pub fn from_paragraphs(
        expected_paragraphs: usize,
        paragraphs: Vec<String>,
    ) -> Result<Self, SyncError> {
        if paragraphs.len() != expected_paragraphs {
            return Err(SyncError::ParagraphCountMismatch {
                expected: expected_paragraphs,
                got: paragraphs.len(),
            });
        }

        let mut assembler = TranslationAssembler::new(expected_paragraphs);
        for (i, text) in paragraphs.into_iter().enumerate() {
            assembler.resolve(i, text)?;
        }
        let (text, correspondence) = assembler.assemble();

        Ok(Self {
            text,
            correspondence,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn correspondence(&self) -> &ParagraphCorrespondence {
        &self.correspondence
    }
}

/// One entry of the page correspondence table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEntry {
    /// Counterpart page in the other rendition
    Mapped(usize),
    /// Translation for this page has not resolved; do not guess
    Pending,
}

impl SyncEntry {
    /// The mapped page number, if any
    pub fn page(&self) -> Option<usize> {
        match self {
            SyncEntry::Mapped(page) => Some(*page),
            SyncEntry::Pending => None,
        }
    }
}

/// Monotonic page-to-page correspondence between the original rendition
/// and its translation
///
/// Valid for one (original run, translated run) pair; rebuilt whenever
/// either side repaginates or more translations resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTable {
    forward: Vec<SyncEntry>,
    reverse: Vec<SyncEntry>,
}

impl SyncTable {
    /// Build the correspondence table.
    ///
    /// For each original page: take the paragraph containing the page
    /// start, map it through the correspondence to a translated range, and
    /// pick the translated page containing that range's start (ties break
    /// toward the lowest page, keeping the table monotonic). Pages whose
    /// paragraph has no resolved translation get a pending marker.
    pub fn build(
        original: &AnchorMap,
        paragraphs: &ParagraphIndex,
        translated: &AnchorMap,
        correspondence: &ParagraphCorrespondence,
    ) -> Self {
        let forward = Self::build_forward(original, paragraphs, translated, correspondence);
        let reverse = Self::build_reverse(original, paragraphs, translated, correspondence);

        log::debug!(
            "sync table: {} original pages, {} translated pages, {} pending",
            forward.len(),
            reverse.len(),
            forward
                .iter()
                .filter(|e| matches!(e, SyncEntry::Pending))
                .count(),
        );

        Self { forward, reverse }
    }

    fn build_forward(
        original: &AnchorMap,
        paragraphs: &ParagraphIndex,
        translated: &AnchorMap,
        correspondence: &ParagraphCorrespondence,
    ) -> Vec<SyncEntry> {
        let mut entries = Vec::with_capacity(original.total_pages());
        let mut floor = 1;

        for page in original.pages() {
            if page.range.is_empty() {
                // Only the empty document produces an empty page
                entries.push(SyncEntry::Mapped(floor));
                continue;
            }

            let (para, _) = paragraphs.para_at_offset(page.range.start);
            let entry = match correspondence.range(para.0) {
                Some(range) => {
                    let mapped = translated.page_for_offset(range.start).max(floor);
                    floor = mapped;
                    SyncEntry::Mapped(mapped)
                }
                None => SyncEntry::Pending,
            };
            entries.push(entry);
        }

        entries
    }

    fn build_reverse(
        original: &AnchorMap,
        paragraphs: &ParagraphIndex,
        translated: &AnchorMap,
        correspondence: &ParagraphCorrespondence,
    ) -> Vec<SyncEntry> {
        // Resolved paragraph starts in translated-text order
        let resolved: SmallVec<[(usize, usize); 16]> = correspondence
            .iter_resolved()
            .map(|(para, range)| (range.start, para))
            .collect();

        let mut entries = Vec::with_capacity(translated.total_pages());
        let mut floor = 1;

        for page in translated.pages() {
            if resolved.is_empty() {
                entries.push(SyncEntry::Pending);
                continue;
            }

            // Last resolved paragraph starting at or before this page
            let idx = resolved
                .partition_point(|&(start, _)| start <= page.range.start)
                .saturating_sub(1);
            let (_, para) = resolved[idx];

            let entry = match paragraphs.range(crate::document::ParagraphId(para)) {
                Some(range) => {
                    let mapped = original.page_for_offset(range.start).max(floor);
                    floor = mapped;
                    SyncEntry::Mapped(mapped)
                }
                None => SyncEntry::Pending,
            };
            entries.push(entry);
        }

        entries
    }

    /// Translated counterpart of an original page
    pub fn translated_page_for(&self, original_page: usize) -> Option<SyncEntry> {
        self.forward.get(original_page.checked_sub(1)?).copied()
    }

    /// Original counterpart of a translated page
    pub fn original_page_for(&self, translated_page: usize) -> Option<SyncEntry> {
        self.reverse.get(translated_page.checked_sub(1)?).copied()
    }

    /// Number of original pages covered
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Whether every original page has a mapped counterpart
    pub fn is_complete(&self) -> bool {
        self.forward
            .iter()
            .all(|e| matches!(e, SyncEntry::Mapped(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::layout::{FontMetrics, LayoutParameters, Measurer};

    /// 10 chars per line, 5 lines per page
    fn test_params() -> LayoutParameters {
        LayoutParameters {
            font_size: 16.0,
            line_height: 1.0,
            margin_step: 0,
            viewport_width: 104.0,
            viewport_height: 104.0,
            ..Default::default()
        }
    }

    fn test_measurer() -> Measurer {
        Measurer::new(FontMetrics::monospaced(8.0, 16.0))
    }

    fn paragraphs(count: usize, width: usize, fill: char) -> String {
        let para: String = std::iter::repeat(fill).take(width).collect();
        vec![para; count].join("\n")
    }

    #[test]
    fn test_paragraph_count_mismatch_rejected() {
        let err = TranslatedText::from_paragraphs(3, vec!["eins".into(), "zwei".into()]);
        assert_eq!(
            err,
            Err(SyncError::ParagraphCountMismatch {
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn test_assembler_partial_assembly() {
        let mut assembler = TranslationAssembler::new(3);
        assembler.resolve(0, "alpha").unwrap();
        assembler.resolve(2, "gamma").unwrap();

        let (text, corr) = assembler.assemble();
        assert_eq!(text, "alpha\ngamma");
        assert_eq!(corr.range(0), Some(0..5));
        assert_eq!(corr.range(1), None);
        assert_eq!(corr.range(2), Some(6..11));
        assert!(!assembler.is_complete());
    }

    #[test]
    fn test_assembler_out_of_range() {
        let mut assembler = TranslationAssembler::new(2);
        assert_eq!(
            assembler.resolve(5, "x"),
            Err(SyncError::ParagraphOutOfRange(5, 2))
        );
    }

    #[test]
    fn test_assembler_fill_from_cache() {
        let mut cache = MemoryTranslationCache::new();
        cache.put("doc", 0, "de", "Hallo".to_string());
        cache.mark_failed("doc", 1, "de");

        let mut assembler = TranslationAssembler::new(3);
        assembler.fill_from_cache(&cache, "doc", "de");

        let (text, corr) = assembler.assemble();
        assert_eq!(text, "Hallo");
        assert!(assembler.has_failures());
        assert_eq!(corr.resolved_count(), 1);
    }

    #[test]
    fn test_sync_table_monotonic() {
        // Original: 8 paragraphs of 40 chars; translation inflates each
        // to 90 chars, so the translated rendition has more pages
        let original_text = paragraphs(8, 40, 'o');
        let translated: Vec<String> =
            (0..8).map(|_| "t".repeat(90)).collect();

        let doc = Document::from_text("doc", &original_text);
        let omap = AnchorMap::build(&doc, &test_params(), &test_measurer());

        let translation =
            TranslatedText::from_paragraphs(doc.paragraphs().len(), translated).unwrap();
        let tdoc = Document::from_text("doc#de", translation.text());
        let tmap = AnchorMap::build(&tdoc, &test_params(), &test_measurer());

        let table = SyncTable::build(&omap, doc.paragraphs(), &tmap, translation.correspondence());
        assert!(table.is_complete());

        let mut previous = 0;
        for page in 1..=omap.total_pages() {
            let mapped = table.translated_page_for(page).unwrap().page().unwrap();
            assert!(mapped >= previous, "crossing at original page {page}");
            assert!(mapped <= tmap.total_pages());
            previous = mapped;
        }
    }

    #[test]
    fn test_reverse_lookup_monotonic() {
        let original_text = paragraphs(6, 120, 'o');
        let translated: Vec<String> = (0..6).map(|_| "t".repeat(30)).collect();

        let doc = Document::from_text("doc", &original_text);
        let omap = AnchorMap::build(&doc, &test_params(), &test_measurer());
        let translation =
            TranslatedText::from_paragraphs(doc.paragraphs().len(), translated).unwrap();
        let tdoc = Document::from_text("doc#de", translation.text());
        let tmap = AnchorMap::build(&tdoc, &test_params(), &test_measurer());

        let table = SyncTable::build(&omap, doc.paragraphs(), &tmap, translation.correspondence());

        let mut previous = 0;
        for page in 1..=tmap.total_pages() {
            let mapped = table.original_page_for(page).unwrap().page().unwrap();
            assert!(mapped >= previous);
            previous = mapped;
        }
    }

    #[test]
    fn test_unresolved_pages_are_pending() {
        let original_text = paragraphs(4, 100, 'o');
        let doc = Document::from_text("doc", &original_text);
        let omap = AnchorMap::build(&doc, &test_params(), &test_measurer());

        // Only the first paragraph resolved
        let mut assembler = TranslationAssembler::new(4);
        assembler.resolve(0, "t".repeat(100)).unwrap();
        let (text, corr) = assembler.assemble();

        let tdoc = Document::from_text("doc#de", text);
        let tmap = AnchorMap::build(&tdoc, &test_params(), &test_measurer());
        let table = SyncTable::build(&omap, doc.paragraphs(), &tmap, &corr);

        assert!(!table.is_complete());
        // First page starts in paragraph 0, which is resolved
        assert!(matches!(
            table.translated_page_for(1),
            Some(SyncEntry::Mapped(1))
        ));
        // The last page starts in an unresolved paragraph
        let last = omap.total_pages();
        assert_eq!(table.translated_page_for(last), Some(SyncEntry::Pending));
    }

    #[test]
    fn test_empty_documents_map_to_each_other() {
        let doc = Document::from_text("doc", "");
        let omap = AnchorMap::build(&doc, &test_params(), &test_measurer());

        let translation = TranslatedText::from_paragraphs(1, vec![String::new()]).unwrap();
        let tdoc = Document::from_text("doc#de", translation.text());
        let tmap = AnchorMap::build(&tdoc, &test_params(), &test_measurer());

        let table = SyncTable::build(&omap, doc.paragraphs(), &tmap, translation.correspondence());
        assert_eq!(table.translated_page_for(1), Some(SyncEntry::Mapped(1)));
    }
}
