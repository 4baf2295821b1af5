//! Block flow surface: off-screen layout of a content tree

use crate::document::{BlockKind, ContentTree, Display, NodeId};
use crate::error::{ReflowError, Result};
use crate::layout::font::FontMetrics;
use crate::layout::line_break::LineBreaker;
use crate::layout::surface::{AdjustedTree, Measurement, MeasurementSurface, NodeBox};

/// Resolved box metrics for one block
#[derive(Debug, Clone, Copy)]
struct BoxMetrics {
    margin_top: f32,
    margin_bottom: f32,
    padding_top: f32,
    padding_bottom: f32,
    padding_left: f32,
}

/// Measurement surface that stacks blocks vertically and line-breaks text
/// with [`FontMetrics`]. Margins do not collapse.
#[derive(Debug, Default)]
pub struct FlowSurface {
    metrics: FontMetrics,
    line_breaker: LineBreaker,
}

impl FlowSurface {
    pub fn new(metrics: FontMetrics) -> Self {
        Self {
            metrics,
            line_breaker: LineBreaker::new(),
        }
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn set_metrics(&mut self, metrics: FontMetrics) {
        self.metrics = metrics;
    }

    fn box_metrics(&self, tree: &ContentTree, id: NodeId, kind: BlockKind) -> BoxMetrics {
        let style = tree.style(id);
        let unit = self.metrics.line_height;
        let default_top = if kind.is_heading() { unit * 0.5 } else { 0.0 };

        BoxMetrics {
            margin_top: style.margin_top.unwrap_or(default_top),
            margin_bottom: style.margin_bottom.unwrap_or(kind.spacing_after() * unit),
            padding_top: style.padding_top.unwrap_or(0.0),
            padding_bottom: style.padding_bottom.unwrap_or(0.0),
            padding_left: style.padding_left.unwrap_or(kind.child_indent()),
        }
    }

    /// Height of a node's anonymous text (own text plus inline children)
    fn text_height(&self, tree: &ContentTree, id: NodeId, kind: BlockKind, width: f32) -> f32 {
        let text = tree.visible_text(id);
        if text.trim().is_empty() {
            return 0.0;
        }
        let metrics = self.metrics.scaled(kind.line_height_multiplier());
        self.line_breaker
            .break_lines(&text, width, &metrics)
            .iter()
            .map(|line| line.height)
            .sum()
    }

    /// Lay out one block whose margin edge starts at `y`. Returns the margin
    /// edge bottom.
    fn layout_block(
        &self,
        adjusted: &AdjustedTree<'_>,
        id: NodeId,
        y: f32,
        width: f32,
        out: &mut Measurement,
    ) -> f32 {
        let tree = adjusted.tree();
        let kind = tree.block_kind(id);
        let m = self.box_metrics(tree, id, kind);

        let top = y + m.margin_top + adjusted.shift(id);
        let content_height = self.layout_contents(
            adjusted,
            id,
            kind,
            top + m.padding_top,
            width - m.padding_left,
            out,
        );
        let height = m.padding_top + content_height + m.padding_bottom;

        out.insert(
            id,
            NodeBox {
                top,
                height,
                margin_top: m.margin_top,
            },
        );

        top + height + m.margin_bottom
    }

    fn layout_contents(
        &self,
        adjusted: &AdjustedTree<'_>,
        id: NodeId,
        kind: BlockKind,
        content_top: f32,
        inner_width: f32,
        out: &mut Measurement,
    ) -> f32 {
        let tree = adjusted.tree();
        let inner_width = inner_width.max(1.0);

        if let Some(fixed) = tree.style(id).height {
            return fixed.max(0.0);
        }

        // Text that is not inside a block child flows first
        let mut cursor = content_top + self.text_height(tree, id, kind, inner_width);
        for &child in tree.children(id) {
            if tree.display(child) == Display::Block {
                cursor = self.layout_block(adjusted, child, cursor, inner_width, out);
            }
        }
        cursor - content_top
    }
}

impl MeasurementSurface for FlowSurface {
    fn measure(&mut self, adjusted: &AdjustedTree<'_>, width: f32) -> Result<Measurement> {
        if !(width.is_finite() && width > 0.0) {
            return Err(ReflowError::Surface(format!("invalid layout width {}", width)));
        }

        let tree = adjusted.tree();
        let root = tree.root();
        let kind = tree.block_kind(root);
        let m = self.box_metrics(tree, root, kind);

        // The root's top edge is the coordinate origin
        let mut measurement = Measurement::new(0.0);
        let content_height = self.layout_contents(
            adjusted,
            root,
            kind,
            m.padding_top,
            width - m.padding_left,
            &mut measurement,
        );
        let scroll_height = m.padding_top + content_height + m.padding_bottom;

        measurement.insert(
            root,
            NodeBox {
                top: 0.0,
                height: scroll_height,
                margin_top: 0.0,
            },
        );
        let measurement = measurement.with_scroll_height(scroll_height);

        Ok(measurement)
    }
}
