//! Font metrics for layout

use serde::{Deserialize, Serialize};

/// Metrics needed for text layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontMetrics {
    /// Line height in logical pixels
    pub line_height: f32,
    /// Width of ASCII characters (0-127)
    pub char_widths: Vec<f32>,
    /// Default width for non-ASCII characters
    pub default_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // 14px body text at 1.4 line height, ~7px average advance
        Self {
            line_height: 19.6,
            char_widths: vec![7.0; 128],
            default_width: 7.0,
        }
    }
}

impl FontMetrics {
    pub fn new(line_height: f32, char_widths: Vec<f32>, default_width: f32) -> Self {
        Self {
            line_height,
            char_widths,
            default_width,
        }
    }

    /// Uniform-advance metrics
    pub fn monospace(line_height: f32, advance: f32) -> Self {
        Self::new(line_height, vec![advance; 128], advance)
    }

    /// Get width of a character
    pub fn width(&self, c: char) -> f32 {
        if c == '\t' {
            return self.default_width * 4.0;
        }
        if c.is_control() {
            return 0.0;
        }
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        self.default_width
    }

    /// Width of a grapheme cluster or run
    pub fn text_width(&self, text: &str) -> f32 {
        text.chars().map(|c| self.width(c)).sum()
    }

    /// Metrics scaled for a larger or smaller font size
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            line_height: self.line_height * factor,
            char_widths: self.char_widths.iter().map(|w| w * factor).collect(),
            default_width: self.default_width * factor,
        }
    }
}
