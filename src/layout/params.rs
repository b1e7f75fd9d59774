//! Typographic parameters for a pagination run

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Margin presets in logical pixels, narrowest to widest
pub const MARGIN_STEPS: [f32; 5] = [12.0, 20.0, 28.0, 36.0, 44.0];

/// Text alignment for rendered pages
///
/// Alignment never moves break positions; it participates in the layout
/// key so renditions with different alignment are distinct runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Justify,
    Center,
}

/// Layout parameters for the document
///
/// Pagination output is a pure function of (document text, parameters),
/// so this is a plain value type with a derived stable identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutParameters {
    /// Font size in logical pixels
    pub font_size: f32,
    /// Line height as a multiple of the font size
    pub line_height: f32,
    /// Margin preset ordinal (0-4)
    pub margin_step: u8,
    /// Text alignment
    pub align: TextAlign,
    /// Viewport width in logical pixels
    pub viewport_width: f32,
    /// Viewport height in logical pixels
    pub viewport_height: f32,
}

impl Default for LayoutParameters {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            line_height: 1.4,
            margin_step: 1,
            align: TextAlign::Left,
            viewport_width: 600.0,
            viewport_height: 800.0,
        }
    }
}

impl LayoutParameters {
    /// Margin size for the configured preset
    pub fn margin(&self) -> f32 {
        MARGIN_STEPS[(self.margin_step as usize).min(MARGIN_STEPS.len() - 1)]
    }

    /// Get usable content width
    pub fn content_width(&self) -> f32 {
        self.viewport_width - 2.0 * self.margin()
    }

    /// Get usable content height per page
    pub fn content_height(&self) -> f32 {
        self.viewport_height - 2.0 * self.margin()
    }

    /// Height of one line in logical pixels
    pub fn line_pixel_height(&self) -> f32 {
        self.font_size * self.line_height
    }

    /// Stable identity of this parameter set
    ///
    /// Floats are scaled to fixed point before hashing so the key does not
    /// depend on float bit patterns and survives serialization round trips.
    pub fn key(&self) -> LayoutKey {
        let mut hasher = rustc_hash::FxHasher::default();
        fixed(self.font_size).hash(&mut hasher);
        fixed(self.line_height).hash(&mut hasher);
        self.margin_step.hash(&mut hasher);
        (self.align as u8).hash(&mut hasher);
        fixed(self.viewport_width).hash(&mut hasher);
        fixed(self.viewport_height).hash(&mut hasher);
        LayoutKey(hasher.finish())
    }
}

/// Scale to hundredths to avoid float hashing
fn fixed(value: f32) -> u32 {
    (value * 100.0).round() as u32
}

/// Stable identity for one set of layout parameters
///
/// Used as the anchor-map cache key and stored in persisted reading
/// positions so a position can tell whether it was captured under the
/// currently active settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutKey(u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_area() {
        let params = LayoutParameters {
            viewport_width: 600.0,
            viewport_height: 800.0,
            margin_step: 1,
            ..Default::default()
        };
        assert_eq!(params.content_width(), 560.0); // 600 - 2 * 20
        assert_eq!(params.content_height(), 760.0);
    }

    #[test]
    fn test_margin_step_clamped() {
        let params = LayoutParameters {
            margin_step: 9,
            ..Default::default()
        };
        assert_eq!(params.margin(), MARGIN_STEPS[4]);
    }

    #[test]
    fn test_key_stability() {
        let a = LayoutParameters::default();
        let b = LayoutParameters::default();
        assert_eq!(a.key(), b.key());

        let c = LayoutParameters {
            font_size: 24.0,
            ..Default::default()
        };
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_key_distinguishes_alignment() {
        let left = LayoutParameters::default();
        let justified = LayoutParameters {
            align: TextAlign::Justify,
            ..Default::default()
        };
        assert_ne!(left.key(), justified.key());
    }
}
