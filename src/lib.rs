//! Duopage: a dual-panel book pagination core
//!
//! This crate provides the reading engine behind a side-by-side book
//! reader:
//! - Deterministic text measurement and line breaking
//! - Greedy pagination into screen-sized pages under typographic settings
//! - Stable anchor maps between character offsets and page numbers
//! - Reading progress that survives font, margin, and viewport changes
//! - Page-aligned synchronization of an original text with its
//!   machine-translated rendition

pub mod anchor;
pub mod document;
pub mod layout;
pub mod progress;
pub mod reflow;
pub mod sync;

// Re-export primary types
pub use anchor::AnchorMap;
pub use document::{Chapter, Document, ParagraphId, ParagraphIndex};
pub use layout::{
    paginate, FitResult, FontMetrics, LayoutKey, LayoutParameters, Measurer, Page, TextAlign,
};
pub use progress::{Bookmark, ReadingPosition};
pub use reflow::{ReflowCoordinator, ReflowRequest};
pub use sync::{
    MemoryTranslationCache, ParagraphCorrespondence, SyncEntry, SyncError, SyncTable,
    TranslatedText, TranslationAssembler, TranslationCache, TranslationStatus,
};

use rustc_hash::FxHashMap;
use std::ops::Range;
use std::sync::Arc;

/// Lifecycle of a reading session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No pagination run has completed yet
    Idle,
    /// A current anchor map is installed and serving lookups
    Paginated,
    /// A reflow is underway; the previous map keeps serving lookups
    Repaginating,
}

/// The translated rendition attached to a session
struct TranslationPanel {
    language: String,
    params: LayoutParameters,
    assembler: TranslationAssembler,
    map: Option<Arc<AnchorMap>>,
    table: Option<SyncTable>,
}

/// A reading session for one open document
///
/// One session per open document; sessions share nothing, so concurrently
/// open books cannot interfere with each other. The session owns the
/// current pagination run, the reader's anchor, and the optional
/// translated panel.
pub struct ReaderSession {
    document: Arc<Document>,
    measurer: Arc<Measurer>,
    params: LayoutParameters,
    state: SessionState,
    current: Option<Arc<AnchorMap>>,
    map_cache: FxHashMap<LayoutKey, Arc<AnchorMap>>,
    /// The reader's position as a byte anchor, never a page number
    anchor: usize,
    translation: Option<TranslationPanel>,
}

impl ReaderSession {
    /// Create a session; call `paginate` (or `open`) before page lookups
    pub fn new(document: Document, params: LayoutParameters) -> Self {
        Self {
            document: Arc::new(document),
            measurer: Arc::new(Measurer::default()),
            params,
            state: SessionState::Idle,
            current: None,
            map_cache: FxHashMap::default(),
            anchor: 0,
            translation: None,
        }
    }

    /// Create a session and run the initial pagination
    pub fn open(document: Document, params: LayoutParameters) -> Self {
        let mut session = Self::new(document, params);
        session.paginate();
        session
    }

    /// Override the font metrics before the first pagination
    pub fn with_metrics(mut self, metrics: FontMetrics) -> Self {
        self.measurer = Arc::new(Measurer::new(metrics));
        self
    }

    /// Get the document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Get the active layout parameters
    pub fn params(&self) -> &LayoutParameters {
        &self.params
    }

    /// Get the session lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run pagination for the current parameters and install the map
    pub fn paginate(&mut self) {
        let map = self.map_for(self.params);
        self.install(map);
    }

    /// Change layout parameters, repaginate, and re-resolve the reader's
    /// anchor before any page number is reported again
    pub fn set_layout_parameters(&mut self, params: LayoutParameters) {
        if params.key() == self.params.key() && self.state == SessionState::Paginated {
            return;
        }
        self.state = SessionState::Repaginating;
        self.params = params;
        let map = self.map_for(params);
        self.install(map);
    }

    /// Mark a background reflow as underway.
    ///
    /// The current map keeps serving lookups until `commit_reflow`
    /// installs its replacement, so the reader never sees a torn run.
    pub fn begin_reflow(&mut self, params: LayoutParameters) {
        self.state = SessionState::Repaginating;
        self.params = params;
    }

    /// Install a map produced elsewhere (e.g. by a `ReflowCoordinator`)
    pub fn commit_reflow(&mut self, map: Arc<AnchorMap>) {
        map.assert_matches(&self.document);
        self.map_cache.insert(map.layout_key(), Arc::clone(&map));
        self.install(map);
    }

    /// Build or fetch the cached map for a parameter set
    fn map_for(&mut self, params: LayoutParameters) -> Arc<AnchorMap> {
        let key = params.key();
        if let Some(map) = self.map_cache.get(&key) {
            return Arc::clone(map);
        }
        let map = Arc::new(AnchorMap::build(&self.document, &params, &self.measurer));
        self.map_cache.insert(key, Arc::clone(&map));
        map
    }

    /// Enter `Paginated` with a new map, keeping the anchor stable
    fn install(&mut self, map: Arc<AnchorMap>) {
        self.current = Some(map);
        self.state = SessionState::Paginated;
        self.refresh_translation();
    }

    /// The current anchor map, if paginated
    pub fn current_map(&self) -> Option<&Arc<AnchorMap>> {
        self.current.as_ref()
    }

    /// The page containing the reader's anchor
    pub fn current_page(&self) -> Option<usize> {
        let map = self.current.as_ref()?;
        Some(map.page_for_offset(self.anchor.min(map.text_len())))
    }

    /// Total pages in the current run; 0 while idle
    pub fn total_pages(&self) -> usize {
        self.current.as_ref().map(|m| m.total_pages()).unwrap_or(0)
    }

    /// Text of a page in the current run
    pub fn page_text(&self, page: usize) -> Option<&str> {
        self.current.as_ref()?.page_text(page)
    }

    /// Move the reader to a page; the anchor becomes the page start
    pub fn go_to_page(&mut self, page: usize) -> bool {
        let Some(map) = self.current.as_ref() else {
            return false;
        };
        match map.range_for_page(page) {
            Some(range) => {
                self.anchor = range.start;
                true
            }
            None => false,
        }
    }

    /// Advance one page; saturates at the last page
    pub fn next_page(&mut self) -> Option<usize> {
        let current = self.current_page()?;
        let target = (current + 1).min(self.total_pages());
        self.go_to_page(target);
        self.current_page()
    }

    /// Go back one page; saturates at the first page
    pub fn prev_page(&mut self) -> Option<usize> {
        let current = self.current_page()?;
        self.go_to_page(current.saturating_sub(1).max(1));
        self.current_page()
    }

    /// Page range of a chapter under the current run
    pub fn chapter_pages(&self, chapter_index: usize) -> Option<Range<usize>> {
        let map = self.current.as_ref()?;
        let chapter = self.document.chapter(chapter_index)?;
        Some(map.chapter_pages(chapter))
    }

    /// Chapter containing a page of the current run
    pub fn chapter_for_page(&self, page: usize) -> Option<(usize, &Chapter)> {
        let map = self.current.as_ref()?;
        let range = map.range_for_page(page)?;
        self.document.chapter_at_offset(range.start)
    }

    /// Jump to the start of a chapter
    pub fn jump_to_chapter(&mut self, chapter_index: usize) -> Option<usize> {
        let chapter = self.document.chapter(chapter_index)?;
        self.anchor = chapter.range.start;
        self.current_page()
    }

    /// Capture the reader's progress as a durable position
    pub fn capture_progress(&self, captured_at_ms: u64) -> Option<ReadingPosition> {
        let map = self.current.as_ref()?;
        let page = self.current_page()?;
        ReadingPosition::capture(page, map, captured_at_ms)
    }

    /// Restore a persisted position; returns the page it lands on
    pub fn restore_progress(&mut self, position: &ReadingPosition) -> Option<usize> {
        let map = self.current.as_ref()?;
        let page = position.resolve(map);
        self.anchor = position.anchor.min(map.text_len());
        Some(page)
    }

    /// Jump to a bookmark; returns the page it lands on
    pub fn jump_to_bookmark(&mut self, bookmark: &Bookmark) -> Option<usize> {
        self.restore_progress(&bookmark.position)
    }

    // --- translated panel ---

    /// Attach a translated rendition in `language`, paginated under its
    /// own parameters (translated text length differs from the original's)
    pub fn attach_translation(&mut self, language: impl Into<String>, params: LayoutParameters) {
        let paragraph_count = self.document.paragraphs().len();
        self.translation = Some(TranslationPanel {
            language: language.into(),
            params,
            assembler: TranslationAssembler::new(paragraph_count),
            map: None,
            table: None,
        });
        self.refresh_translation();
    }

    /// Target language of the attached translation
    pub fn translation_language(&self) -> Option<&str> {
        self.translation.as_ref().map(|p| p.language.as_str())
    }

    /// Record one resolved paragraph translation and refresh the sync
    /// table incrementally
    pub fn resolve_translation(
        &mut self,
        paragraph: usize,
        text: impl Into<String>,
    ) -> Result<(), SyncError> {
        let panel = self.translation.as_mut().ok_or(SyncError::NotAttached)?;
        panel.assembler.resolve(paragraph, text)?;
        self.refresh_translation();
        Ok(())
    }

    /// Record a failed paragraph fetch; the original stays readable and
    /// the page keeps its pending marker
    pub fn fail_translation(&mut self, paragraph: usize) -> Result<(), SyncError> {
        let panel = self.translation.as_mut().ok_or(SyncError::NotAttached)?;
        panel.assembler.mark_failed(paragraph)?;
        self.refresh_translation();
        Ok(())
    }

    /// Pull everything the cache collaborator already holds
    pub fn fill_translations_from_cache<C: TranslationCache + ?Sized>(
        &mut self,
        cache: &C,
    ) -> Result<(), SyncError> {
        let panel = self.translation.as_mut().ok_or(SyncError::NotAttached)?;
        let document_id = self.document.id().to_string();
        panel
            .assembler
            .fill_from_cache(cache, &document_id, &panel.language);
        self.refresh_translation();
        Ok(())
    }

    /// Deliver a complete translation in one shot.
    ///
    /// The paragraph-preservation contract is enforced here: a response
    /// with the wrong paragraph count is rejected untouched.
    pub fn deliver_translation(&mut self, paragraphs: Vec<String>) -> Result<(), SyncError> {
        let expected = self.document.paragraphs().len();
        let panel = self.translation.as_mut().ok_or(SyncError::NotAttached)?;
        if paragraphs.len() != expected {
            return Err(SyncError::ParagraphCountMismatch {
                expected,
                got: paragraphs.len(),
            });
        }
        for (i, text) in paragraphs.into_iter().enumerate() {
            panel.assembler.resolve(i, text)?;
        }
        self.refresh_translation();
        Ok(())
    }

    /// The current sync table, if a translation is attached and the
    /// session is paginated
    pub fn sync_table(&self) -> Option<&SyncTable> {
        self.translation.as_ref()?.table.as_ref()
    }

    /// Translated counterpart of an original page
    pub fn translated_page_for(&self, original_page: usize) -> Option<SyncEntry> {
        self.sync_table()?.translated_page_for(original_page)
    }

    /// Text of a page in the translated rendition
    pub fn translated_page_text(&self, page: usize) -> Option<&str> {
        self.translation.as_ref()?.map.as_ref()?.page_text(page)
    }

    /// Re-paginate the translated panel and rebuild the sync table.
    ///
    /// Runs after any paragraph resolves and after any original reflow;
    /// the original's pagination is never touched from here.
    fn refresh_translation(&mut self) {
        let Some(map) = self.current.clone() else {
            return;
        };
        let Some(panel) = self.translation.as_mut() else {
            return;
        };

        let (text, correspondence) = panel.assembler.assemble();
        let translated_doc = Document::from_text(
            format!("{}#{}", self.document.id(), panel.language),
            text,
        );
        let translated_map = Arc::new(AnchorMap::build(
            &translated_doc,
            &panel.params,
            &self.measurer,
        ));

        panel.table = Some(SyncTable::build(
            &map,
            self.document.paragraphs(),
            &translated_map,
            &correspondence,
        ));
        panel.map = Some(translated_map);
    }
}
