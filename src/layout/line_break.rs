//! Line breaking for leaf text blocks

use crate::layout::font::FontMetrics;
use std::ops::Range;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Layout result for a single line
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    /// Byte range within the text this line covers
    pub byte_range: Range<usize>,
    /// Advance width of the visible content
    pub width: f32,
    /// Line height
    pub height: f32,
}

/// Line breaker
#[derive(Debug, Default)]
pub struct LineBreaker;

impl LineBreaker {
    pub fn new() -> Self {
        Self
    }

    /// Greedily break `text` into lines no wider than `max_width`.
    ///
    /// Always yields at least one line, so an empty block still occupies a
    /// line of height.
    pub fn break_lines(&self, text: &str, max_width: f32, metrics: &FontMetrics) -> Vec<LineLayout> {
        let mut lines = Vec::new();
        let mut line_start = 0usize;
        let mut line_width = 0.0f32;
        let mut segment_start = 0usize;

        for (break_at, opportunity) in linebreaks(text) {
            let segment = &text[segment_start..break_at];
            let visible_width = metrics.text_width(segment.trim_end());

            if line_width > 0.0 && line_width + visible_width > max_width {
                lines.push(Self::line(text, line_start..segment_start, metrics));
                line_start = segment_start;
                line_width = 0.0;
            }

            if line_width == 0.0 && visible_width > max_width {
                // Emergency break inside an unbreakable run
                let end = segment_start + segment.trim_end().len();
                let (start, width) =
                    Self::break_graphemes(text, line_start..end, max_width, metrics, &mut lines);
                line_start = start;
                line_width = width;
            } else {
                line_width += metrics.text_width(segment);
            }

            if opportunity == BreakOpportunity::Mandatory && break_at < text.len() {
                lines.push(Self::line(text, line_start..break_at, metrics));
                line_start = break_at;
                line_width = 0.0;
            }

            segment_start = break_at;
        }

        if line_start < text.len() || lines.is_empty() {
            lines.push(Self::line(text, line_start..text.len(), metrics));
        }

        lines
    }

    fn line(text: &str, byte_range: Range<usize>, metrics: &FontMetrics) -> LineLayout {
        LineLayout {
            width: metrics.text_width(text[byte_range.clone()].trim_end()),
            byte_range,
            height: metrics.line_height,
        }
    }

    /// Split an over-wide run at grapheme boundaries. Returns the start
    /// offset and width of the trailing partial line.
    fn break_graphemes(
        text: &str,
        run: Range<usize>,
        max_width: f32,
        metrics: &FontMetrics,
        lines: &mut Vec<LineLayout>,
    ) -> (usize, f32) {
        let mut start = run.start;
        let mut width = 0.0f32;

        for (offset, grapheme) in text[run.clone()].grapheme_indices(true) {
            let cluster_width = metrics.text_width(grapheme);
            let byte_idx = run.start + offset;
            if width > 0.0 && width + cluster_width > max_width {
                lines.push(Self::line(text, start..byte_idx, metrics));
                start = byte_idx;
                width = 0.0;
            }
            width += cluster_width;
        }

        (start, width)
    }
}
