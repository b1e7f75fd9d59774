//! Greedy pagination of a full text into screen-sized pages

use crate::layout::measure::Measurer;
use crate::layout::params::LayoutParameters;
use std::ops::Range;

/// One page produced by a pagination run
///
/// Pages of a run are contiguous and non-overlapping, numbered densely
/// from 1, and all record the same total count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page number (1-based, dense)
    pub number: usize,
    /// Byte range into the source text
    pub range: Range<usize>,
    /// The rendered text slice
    pub text: String,
    /// Total pages in this run
    pub total_pages: usize,
}

/// Paginate a text under the given parameters.
///
/// Greedily consumes the text through the measurer until it reports a
/// boundary, emits a page, advances, and repeats. The empty text produces
/// exactly one empty page so navigation always has something to show.
/// Deterministic: identical inputs yield byte-identical page lists.
pub fn paginate(text: &str, params: &LayoutParameters, measurer: &Measurer) -> Vec<Page> {
    // A pagination run is never cancelled from within
    match paginate_with_cancel(text, params, measurer, &|| false) {
        Some(pages) => pages,
        None => unreachable!("pagination without a cancel signal always completes"),
    }
}

/// Cancellable variant used by reflow workers.
///
/// `cancelled` is polled between pages; returns `None` if it fired, in
/// which case no partial output is exposed.
pub fn paginate_with_cancel(
    text: &str,
    params: &LayoutParameters,
    measurer: &Measurer,
    cancelled: &dyn Fn() -> bool,
) -> Option<Vec<Page>> {
    let mut pages = Vec::new();

    if text.is_empty() {
        pages.push(Page {
            number: 1,
            range: 0..0,
            text: String::new(),
            total_pages: 1,
        });
        return Some(pages);
    }

    let mut offset = 0;
    while offset < text.len() {
        if cancelled() {
            log::debug!("pagination cancelled at offset {offset}");
            return None;
        }

        let fit = measurer.measure(&text[offset..], params);
        // The measurer guarantees progress on any non-empty slice; consume
        // the remainder outright if it ever reports none.
        let consumed = if fit.consumed == 0 {
            text.len() - offset
        } else {
            fit.consumed
        };
        let end = offset + consumed;

        pages.push(Page {
            number: pages.len() + 1,
            range: offset..end,
            text: text[offset..end].to_string(),
            total_pages: 0,
        });
        offset = end;
    }

    let total = pages.len();
    for page in &mut pages {
        page.total_pages = total;
    }

    log::debug!(
        "paginated {} bytes into {} pages (font {}px)",
        text.len(),
        total,
        params.font_size
    );
    Some(pages)
}
