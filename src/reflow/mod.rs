//! Background repagination with cancellation and debounce
//!
//! Pagination is pure and CPU-bound, so it runs off the interactive
//! thread. Only one run per document is live at a time: a newer request
//! bumps the generation counter, which any in-flight run polls between
//! pages. The previously committed anchor map stays installed until a
//! replacement fully completes, so readers never see a torn page list.

use crate::anchor::AnchorMap;
use crate::document::Document;
use crate::layout::{LayoutKey, LayoutParameters, Measurer};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Outcome of a reflow request
#[derive(Debug)]
pub enum ReflowRequest {
    /// Served from the per-layout-key cache; the map is already current
    Cached(Arc<AnchorMap>),
    /// A worker was spawned; join it to wait for completion in tests
    Scheduled(JoinHandle<()>),
}

struct ReflowShared {
    /// Bumped on every request; in-flight runs poll it to cancel
    generation: AtomicU64,
    state: Mutex<ReflowState>,
}

#[derive(Default)]
struct ReflowState {
    current: Option<Arc<AnchorMap>>,
    cache: FxHashMap<LayoutKey, Arc<AnchorMap>>,
}

/// Coordinates background pagination runs for one open document
pub struct ReflowCoordinator {
    document: Arc<Document>,
    measurer: Arc<Measurer>,
    shared: Arc<ReflowShared>,
    debounce: Duration,
}

impl ReflowCoordinator {
    /// Create a coordinator with a debounce window for rapid settings
    /// changes (e.g. a font-size slider)
    pub fn new(document: Arc<Document>, measurer: Measurer, debounce: Duration) -> Self {
        Self {
            document,
            measurer: Arc::new(measurer),
            shared: Arc::new(ReflowShared {
                generation: AtomicU64::new(0),
                state: Mutex::new(ReflowState::default()),
            }),
            debounce,
        }
    }

    /// The last fully committed anchor map, if any
    pub fn current(&self) -> Option<Arc<AnchorMap>> {
        self.shared.state.lock().ok()?.current.clone()
    }

    /// Request a reflow under new parameters.
    ///
    /// Cancels any in-flight run. A map already cached for these
    /// parameters is installed immediately without spawning a worker.
    pub fn request(&self, params: LayoutParameters) -> ReflowRequest {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let key = params.key();

        if let Ok(mut state) = self.shared.state.lock() {
            if let Some(map) = state.cache.get(&key).cloned() {
                log::debug!("reflow {generation}: cache hit");
                state.current = Some(Arc::clone(&map));
                return ReflowRequest::Cached(map);
            }
        }

        let document = Arc::clone(&self.document);
        let measurer = Arc::clone(&self.measurer);
        let shared = Arc::clone(&self.shared);
        let debounce = self.debounce;

        let handle = thread::spawn(move || {
            if !debounce.is_zero() {
                thread::sleep(debounce);
            }
            if shared.generation.load(Ordering::SeqCst) != generation {
                log::debug!("reflow {generation}: superseded during debounce");
                return;
            }

            let cancelled = || shared.generation.load(Ordering::SeqCst) != generation;
            let Some(map) = AnchorMap::build_with_cancel(&document, &params, &measurer, &cancelled)
            else {
                log::debug!("reflow {generation}: cancelled mid-run");
                return;
            };
            let map = Arc::new(map);

            let Ok(mut state) = shared.state.lock() else {
                return;
            };
            // Re-check under the lock: a cancelled run must not commit
            if shared.generation.load(Ordering::SeqCst) != generation {
                log::debug!("reflow {generation}: superseded before commit");
                return;
            }

            log::debug!("reflow {generation}: committed {} pages", map.total_pages());
            state.cache.insert(key, Arc::clone(&map));
            state.current = Some(map);
        });

        ReflowRequest::Scheduled(handle)
    }

    /// Cancel any in-flight run; used when the reader closes the document.
    ///
    /// The committed map is also dropped so no further state outlives the
    /// session.
    pub fn close(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut state) = self.shared.state.lock() {
            state.current = None;
            state.cache.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FontMetrics;

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

    fn coordinator(text: &str) -> ReflowCoordinator {
        ReflowCoordinator::new(
            Arc::new(Document::from_text("doc", text)),
            Measurer::new(FontMetrics::monospaced(8.0, 16.0)),
            Duration::ZERO,
        )
    }

    fn wait(request: ReflowRequest) {
        if let ReflowRequest::Scheduled(handle) = request {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_reflow_commits_map() {
        let coordinator = coordinator(&"a".repeat(500));
        assert!(coordinator.current().is_none());

        wait(coordinator.request(test_params()));

        let map = coordinator.current().unwrap();
        assert_eq!(map.total_pages(), 10);
    }

    #[test]
    fn test_newer_request_wins() {
        let coordinator = coordinator(&"word ".repeat(500));
        let small = test_params();
        let large = LayoutParameters {
            font_size: 32.0,
            ..small
        };

        let first = coordinator.request(small);
        let second = coordinator.request(large);
        wait(first);
        wait(second);

        // Whatever interleaving occurred, the committed map is the newer
        // request's
        let map = coordinator.current().unwrap();
        assert_eq!(map.layout_key(), large.key());
    }

    #[test]
    fn test_cache_hit_skips_worker() {
        let coordinator = coordinator(&"a".repeat(500));
        wait(coordinator.request(test_params()));

        match coordinator.request(test_params()) {
            ReflowRequest::Cached(map) => assert_eq!(map.total_pages(), 10),
            ReflowRequest::Scheduled(_) => panic!("expected a cache hit"),
        }
    }

    #[test]
    fn test_close_discards_state() {
        let coordinator = coordinator("some text");
        wait(coordinator.request(test_params()));
        assert!(coordinator.current().is_some());

        coordinator.close();
        assert!(coordinator.current().is_none());
    }

    #[test]
    fn test_cancelled_run_does_not_commit() {
        let coordinator = coordinator(&"word ".repeat(2000));
        let request = coordinator.request(test_params());
        // Closing bumps the generation; the in-flight run must observe it
        coordinator.close();
        wait(request);

        assert!(coordinator.current().is_none());
    }
}
