//! Boundary contract with the translation/caching collaborator
//!
//! The core never blocks on translation: it asks, gets back one of three
//! states, and renders the original text in the meantime.

use rustc_hash::FxHashMap;
use std::ops::Range;

/// Result of a translation lookup for a paragraph range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationStatus {
    /// Translated text, one line per requested paragraph
    Ready(String),
    /// Translation not available yet; ask again later
    Pending,
    /// The collaborator failed for this range; retriable
    Failed,
}

/// Contract the core requires from its translation cache collaborator.
///
/// Lookups must be idempotent and safely retriable; the collaborator owns
/// its own consistency discipline. Paragraph ranges are ordinals into the
/// original document's paragraph index.
pub trait TranslationCache {
    /// Fetch the translation of a paragraph range, if available
    fn get(
        &self,
        document_id: &str,
        paragraphs: Range<usize>,
        target_language: &str,
    ) -> TranslationStatus;

    /// Store a resolved translation for a single paragraph
    fn put(&mut self, document_id: &str, paragraph: usize, target_language: &str, text: String);

    /// Record a failed fetch for a single paragraph
    fn mark_failed(&mut self, document_id: &str, paragraph: usize, target_language: &str);
}

/// In-memory cache, used in tests and as a per-session L1 in front of a
/// real collaborator
#[derive(Debug, Default)]
pub struct MemoryTranslationCache {
    entries: FxHashMap<(String, String, usize), TranslationStatus>,
}

impl MemoryTranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(document_id: &str, target_language: &str, paragraph: usize) -> (String, String, usize) {
        (document_id.to_string(), target_language.to_string(), paragraph)
    }
}

impl TranslationCache for MemoryTranslationCache {
    fn get(
        &self,
        document_id: &str,
        paragraphs: Range<usize>,
        target_language: &str,
    ) -> TranslationStatus {
        let mut parts = Vec::with_capacity(paragraphs.len());

        for paragraph in paragraphs {
            match self
                .entries
                .get(&Self::key(document_id, target_language, paragraph))
            {
                Some(TranslationStatus::Ready(text)) => parts.push(text.as_str()),
                Some(TranslationStatus::Failed) => return TranslationStatus::Failed,
                Some(TranslationStatus::Pending) | None => return TranslationStatus::Pending,
            }
        }

        TranslationStatus::Ready(parts.join("\n"))
    }

    fn put(&mut self, document_id: &str, paragraph: usize, target_language: &str, text: String) {
        self.entries.insert(
            Self::key(document_id, target_language, paragraph),
            TranslationStatus::Ready(text),
        );
    }

    fn mark_failed(&mut self, document_id: &str, paragraph: usize, target_language: &str) {
        self.entries.insert(
            Self::key(document_id, target_language, paragraph),
            TranslationStatus::Failed,
        );
    }
}
