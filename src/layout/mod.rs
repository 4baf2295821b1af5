//! Measurement, overflow analysis and page allocation

mod flow;
pub mod font;
mod line_break;
pub mod overflow;
pub mod pagination;
pub mod surface;

pub use flow::FlowSurface;
pub use font::FontMetrics;
pub use line_break::{LineBreaker, LineLayout};
pub use overflow::{check_split, compute_adjustments, measured_blocks, MeasuredBlock, PageMetrics, SplitCheck};
pub use pagination::{allocate_pages, page_at_scroll_offset, page_count, scroll_offset_for_page, PageSlot};
pub use surface::{
    apply_adjustments, AdjustedTree, HostBox, HostMeasurement, Measurement, MeasurementSurface, NodeBox,
};
