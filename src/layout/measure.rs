//! Layout measurement: how much text fits in a bounded area
//!
//! This is the deterministic core the paginator is built on. Given a text
//! slice and layout parameters it fills lines greedily and reports the
//! byte length of the leading portion that fits one page.

use crate::layout::font::FontMetrics;
use crate::layout::params::LayoutParameters;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Result of measuring a slice against one page area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitResult {
    /// Bytes of the slice that fit, always a grapheme boundary
    pub consumed: usize,
    /// Whether text remained after the area filled up
    pub overflowed: bool,
}

/// Text measurer bound to one set of font metrics
#[derive(Debug, Clone, Default)]
pub struct Measurer {
    metrics: FontMetrics,
}

impl Measurer {
    pub fn new(metrics: FontMetrics) -> Self {
        Self { metrics }
    }

    /// Get the font metrics in use
    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Measure how much of `slice` fits one page under `params`.
    ///
    /// Break opportunities follow UAX #14; a word is only split when it
    /// alone exceeds the line width, and then at a grapheme boundary so
    /// forward progress is guaranteed. A non-positive content area
    /// degenerates to consuming the entire slice as a single page.
    pub fn measure(&self, slice: &str, params: &LayoutParameters) -> FitResult {
        if slice.is_empty() {
            return FitResult {
                consumed: 0,
                overflowed: false,
            };
        }

        let content_width = params.content_width();
        let content_height = params.content_height();
        let line_height = params.line_pixel_height();

        if content_width <= 0.0 || content_height <= 0.0 || line_height <= 0.0 {
            // Degenerate area: the whole remaining text becomes one page
            return FitResult {
                consumed: slice.len(),
                overflowed: false,
            };
        }

        let max_lines = ((content_height / line_height) as usize).max(1);

        let breaks: Vec<(usize, BreakOpportunity)> = linebreaks(slice).collect();
        let mut next_break = 0;

        let mut lines_used = 0;
        let mut line_start = 0;
        let mut x = 0.0_f32;
        // Last allowed break in the current line and the line width up to it
        let mut last_break: Option<usize> = None;
        let mut last_break_x = 0.0_f32;

        for (idx, grapheme) in slice.grapheme_indices(true) {
            // Break opportunities at this cluster boundary
            let mut mandatory_here = false;
            while next_break < breaks.len() && breaks[next_break].0 <= idx {
                let (offset, kind) = breaks[next_break];
                if offset == idx {
                    match kind {
                        BreakOpportunity::Mandatory => mandatory_here = true,
                        BreakOpportunity::Allowed => {
                            last_break = Some(idx);
                            last_break_x = x;
                        }
                    }
                }
                next_break += 1;
            }

            if mandatory_here && idx > line_start {
                lines_used += 1;
                if lines_used == max_lines && idx < slice.len() {
                    return FitResult {
                        consumed: idx,
                        overflowed: true,
                    };
                }
                line_start = idx;
                x = 0.0;
                last_break = None;
            }

            let width = self.grapheme_advance(grapheme, params.font_size);

            // Soft wrap before this cluster
            if x + width > content_width && idx > line_start {
                let break_at = match last_break {
                    Some(bp) if bp > line_start => bp,
                    // Emergency break inside an unbreakable word
                    _ => idx,
                };

                lines_used += 1;
                if lines_used == max_lines {
                    return FitResult {
                        consumed: break_at,
                        overflowed: true,
                    };
                }

                if break_at == idx {
                    x = 0.0;
                } else {
                    // Width of the carried-over run [break_at, idx)
                    x -= last_break_x;
                }
                line_start = break_at;
                last_break = None;
            }

            x += width;
        }

        FitResult {
            consumed: slice.len(),
            overflowed: false,
        }
    }

    /// Advance width of one grapheme cluster
    fn grapheme_advance(&self, grapheme: &str, font_size: f32) -> f32 {
        if grapheme == "\t" {
            return self.metrics.advance(' ', font_size) * 4.0;
        }
        if grapheme.chars().all(|c| c.is_control()) {
            return 0.0;
        }
        grapheme
            .chars()
            .map(|c| self.metrics.advance(c, font_size))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10 chars per line, 5 lines per page, with monospaced 8px advances
    fn test_params() -> LayoutParameters {
        LayoutParameters {
            font_size: 16.0,
            line_height: 1.0, // line height 16px
            margin_step: 0,   // 12px margins
            viewport_width: 104.0,  // content width 80 = 10 chars
            viewport_height: 104.0, // content height 80 = 5 lines
            ..Default::default()
        }
    }

    fn test_measurer() -> Measurer {
        Measurer::new(FontMetrics::monospaced(8.0, 16.0))
    }

    #[test]
    fn test_empty_slice() {
        let fit = test_measurer().measure("", &test_params());
        assert_eq!(fit.consumed, 0);
        assert!(!fit.overflowed);
    }

    #[test]
    fn test_short_text_fits() {
        let fit = test_measurer().measure("Hello", &test_params());
        assert_eq!(fit.consumed, 5);
        assert!(!fit.overflowed);
    }

    #[test]
    fn test_unbreakable_token_force_broken() {
        // 10 chars per line * 5 lines = 50 chars per page
        let text = "a".repeat(120);
        let fit = test_measurer().measure(&text, &test_params());
        assert_eq!(fit.consumed, 50);
        assert!(fit.overflowed);
    }

    #[test]
    fn test_wraps_at_word_boundary() {
        // "aaaa bbbb " is 10 wide; "cc" pushes past the width so the line
        // breaks after the trailing space
        let params = LayoutParameters {
            viewport_height: 104.0 + 16.0 * 95.0, // plenty of lines
            ..test_params()
        };
        let fit = test_measurer().measure("aaaa bbbb cc", &params);
        assert_eq!(fit.consumed, 12);
        assert!(!fit.overflowed);
    }

    #[test]
    fn test_word_break_never_splits_fitting_word() {
        // One line per page: "hello worlds" breaks after "hello " because
        // "worlds" fits a line on its own
        let params = LayoutParameters {
            viewport_height: 24.0 + 16.0, // content height 16 = 1 line
            margin_step: 0,
            viewport_width: 104.0,
            font_size: 16.0,
            line_height: 1.0,
            ..Default::default()
        };
        let fit = test_measurer().measure("hello worlds", &params);
        assert_eq!(fit.consumed, 6);
        assert!(fit.overflowed);
    }

    #[test]
    fn test_newline_forces_line_break() {
        // Two lines per page; three newline-separated segments overflow
        let params = LayoutParameters {
            viewport_height: 24.0 + 32.0, // content height 32 = 2 lines
            margin_step: 0,
            viewport_width: 104.0,
            font_size: 16.0,
            line_height: 1.0,
            ..Default::default()
        };
        let fit = test_measurer().measure("ab\ncd\nef", &params);
        // Consumed through "ab\ncd\n"; "ef" starts the next page
        assert_eq!(fit.consumed, 6);
        assert!(fit.overflowed);
    }

    #[test]
    fn test_degenerate_area_takes_everything() {
        let params = LayoutParameters {
            viewport_width: 10.0, // below 2 * margin
            ..test_params()
        };
        let fit = test_measurer().measure("some text here", &params);
        assert_eq!(fit.consumed, 14);
        assert!(!fit.overflowed);
    }

    #[test]
    fn test_progress_on_tiny_area() {
        // Area positive but narrower than one character: still consumes
        // at least one cluster per line
        let params = LayoutParameters {
            viewport_width: 25.0, // content width 1.0
            viewport_height: 25.0,
            margin_step: 0,
            font_size: 16.0,
            line_height: 1.0,
            ..Default::default()
        };
        let fit = test_measurer().measure("abcdef", &params);
        assert!(fit.consumed >= 1);
    }

    #[test]
    fn test_deterministic() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(20);
        let a = test_measurer().measure(&text, &test_params());
        let b = test_measurer().measure(&text, &test_params());
        assert_eq!(a, b);
    }
}
