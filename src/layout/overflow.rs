//! Overflow avoidance: keep short text blocks off page boundaries
//!
//! Leaf text blocks are checked in document order against the page grid.
//! A block that straddles a boundary and would leave an orphan fragment on
//! either side is pushed down to start exactly on the next page. Each push
//! shifts every later block, so the analysis is a fold over the measured
//! blocks with the cumulative shift as the accumulator.

use crate::config::ReflowConfig;
use crate::document::{resolve_path, ContentTree, StructuralPath};
use crate::layout::surface::Measurement;
use crate::style::Adjustment;

/// Geometry of one leaf text block in the unadjusted flow
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredBlock {
    pub path: StructuralPath,
    pub top: f32,
    pub height: f32,
    pub margin_top: f32,
}

/// Page grid parameters the analyzer needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub page_height: f32,
    pub min_element_height: f32,
}

impl PageMetrics {
    /// Blocks taller than this may be cut
    pub fn max_pushable_height(&self) -> f32 {
        3.0 * self.min_element_height
    }
}

impl From<&ReflowConfig> for PageMetrics {
    fn from(config: &ReflowConfig) -> Self {
        Self {
            page_height: config.page_height,
            min_element_height: config.min_element_height,
        }
    }
}

/// How a block at a given position relates to the page grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitCheck {
    /// Wholly inside one page
    Fits,
    /// Split, but both fragments are tall enough to stand alone
    Tolerated { before: f32, after: f32 },
    /// Split with an orphan; push down by this many pixels
    Push(f32),
}

/// Classify a block spanning `[top, top + height)`
pub fn check_split(top: f32, height: f32, metrics: &PageMetrics) -> SplitCheck {
    let bottom = top + height;
    let start_page = (top / metrics.page_height).floor();
    let end_page = ((bottom - 1.0) / metrics.page_height).floor();
    // Sub-pixel blocks just below a boundary give end_page < start_page
    if end_page <= start_page {
        return SplitCheck::Fits;
    }

    let next_page_start = (start_page + 1.0) * metrics.page_height;
    let before = next_page_start - top;
    let after = bottom - next_page_start;
    if before < metrics.min_element_height || after < metrics.min_element_height {
        SplitCheck::Push(next_page_start - top)
    } else {
        SplitCheck::Tolerated { before, after }
    }
}

/// Leaf text blocks of `tree` in document order, with their measured
/// geometry. Nodes without a path or a box are skipped.
pub fn measured_blocks(tree: &ContentTree, measurement: &Measurement) -> Vec<MeasuredBlock> {
    tree.descendants()
        .filter(|&id| tree.is_leaf_text_block(id))
        .filter_map(|id| {
            let Some(path) = resolve_path(tree, id) else {
                log::debug!("leaf block {:?} has no structural path", id);
                return None;
            };
            let node_box = measurement.node_box(id)?;
            Some(MeasuredBlock {
                path,
                top: node_box.top,
                height: node_box.height,
                margin_top: node_box.margin_top,
            })
        })
        .collect()
}

/// Compute the shifts that keep short blocks from being split with an
/// orphan. `blocks` must be in document order.
pub fn compute_adjustments(blocks: &[MeasuredBlock], metrics: &PageMetrics) -> Vec<Adjustment> {
    let max_height = metrics.max_pushable_height();

    let (_, adjustments) = blocks
        .iter()
        .filter(|block| block.height > 0.0 && block.height <= max_height)
        .fold((0.0f32, Vec::new()), |(cumulative, mut adjustments), block| {
            let adjusted_top = block.top + cumulative;
            match check_split(adjusted_top, block.height, metrics) {
                SplitCheck::Push(pixels) => {
                    log::trace!("pushing {} down {}px", block.path, pixels);
                    adjustments.push(Adjustment {
                        path: block.path.clone(),
                        pixels,
                        base_margin: block.margin_top,
                    });
                    (cumulative + pixels, adjustments)
                }
                SplitCheck::Fits | SplitCheck::Tolerated { .. } => (cumulative, adjustments),
            }
        });

    adjustments
}
