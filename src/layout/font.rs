//! Font metrics for layout

/// Metrics needed for text measurement
///
/// Widths are expressed at `base_size` and scaled linearly to the active
/// font size; the measurer only needs advance widths, not glyph outlines.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    /// Font size the width tables are expressed at
    pub base_size: f32,
    /// Advance widths of ASCII characters (0-127) at `base_size`
    pub char_widths: Vec<f32>,
    /// Advance for characters outside the table
    pub default_width: f32,
    /// Advance for full-width (CJK) characters
    pub wide_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // Approximation of a proportional serif at 16px
        let mut char_widths = vec![8.4; 128];
        for c in 0..128u8 {
            let width = match c as char {
                ' ' => 4.2,
                'i' | 'l' | 'j' | 'f' | 't' | 'r' => 4.8,
                '.' | ',' | ';' | ':' | '\'' | '!' | '|' | '(' | ')' => 4.5,
                'm' | 'w' => 12.5,
                'M' | 'W' => 14.2,
                'A'..='Z' => 11.0,
                _ => 8.4,
            };
            char_widths[c as usize] = width;
        }

        Self {
            base_size: 16.0,
            char_widths,
            default_width: 8.4,
            wide_width: 16.0,
        }
    }
}

impl FontMetrics {
    /// Uniform-width metrics, mostly useful in tests and benchmarks
    pub fn monospaced(width: f32, base_size: f32) -> Self {
        Self {
            base_size,
            char_widths: vec![width; 128],
            default_width: width,
            wide_width: width * 2.0,
        }
    }

    /// Get the advance width of a character at `base_size`
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        if is_wide(c) {
            self.wide_width
        } else {
            self.default_width
        }
    }

    /// Get the advance width of a character scaled to `font_size`
    pub fn advance(&self, c: char, font_size: f32) -> f32 {
        self.width(c) * font_size / self.base_size
    }
}

/// Full-width character check covering the common CJK blocks
fn is_wide(c: char) -> bool {
    matches!(u32::from(c),
        0x1100..=0x115F          // Hangul Jamo
        | 0x2E80..=0x303E        // CJK radicals, Kangxi, CJK punctuation
        | 0x3041..=0x33FF        // Hiragana, Katakana, compatibility
        | 0x3400..=0x4DBF        // CJK extension A
        | 0x4E00..=0x9FFF        // CJK unified ideographs
        | 0xA000..=0xA4CF        // Yi
        | 0xAC00..=0xD7A3        // Hangul syllables
        | 0xF900..=0xFAFF        // CJK compatibility ideographs
        | 0xFF00..=0xFF60        // Full-width forms
        | 0x20000..=0x2FA1F      // CJK extensions B+
    )
}
