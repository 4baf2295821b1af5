//! Page allocation for the corrected content flow

use crate::config::ReflowConfig;
use serde::{Deserialize, Serialize};

/// The vertical region of the content flow assigned to one rendered page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSlot {
    /// Page index (0-based)
    pub index: usize,
    /// Offset of the slot within the content flow
    pub top: f32,
    /// Full page height, or the residual height for the last page
    pub height: f32,
    pub is_last: bool,
}

impl PageSlot {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Check if a content offset falls inside this slot
    pub fn contains(&self, y: f32) -> bool {
        y >= self.top && y < self.bottom()
    }
}

/// `max(1, ceil(content_height / page_height))`
pub fn page_count(content_height: f32, page_height: f32) -> usize {
    if !(content_height.is_finite() && content_height > 0.0) || page_height <= 0.0 {
        return 1;
    }
    ((content_height / page_height).ceil() as usize).max(1)
}

/// Split the corrected content height into page slots, at most
/// `config.max_pages` of them
pub fn allocate_pages(content_height: f32, config: &ReflowConfig) -> Vec<PageSlot> {
    let page_height = config.page_height;
    let count = page_count(content_height, page_height).min(config.max_pages.max(1));
    let content_height = if content_height.is_finite() {
        content_height.max(0.0)
    } else {
        0.0
    };

    (0..count)
        .map(|index| {
            let top = index as f32 * page_height;
            let is_last = index + 1 == count;
            let height = if is_last {
                (content_height - top).max(config.min_visible_height)
            } else {
                page_height
            };
            PageSlot {
                index,
                top,
                height,
                is_last,
            }
        })
        .collect()
}

/// Scroll position of the top of page `index` in the sheet column
pub fn scroll_offset_for_page(index: usize, config: &ReflowConfig) -> f32 {
    index as f32 * (config.page_height + config.inter_page_gap)
}

/// Page shown at a scroll position, clamped to the page range
pub fn page_at_scroll_offset(y: f32, page_count: usize, config: &ReflowConfig) -> usize {
    let stride = config.page_height + config.inter_page_gap;
    if !(y.is_finite() && y > 0.0) || stride <= 0.0 {
        return 0;
    }
    ((y / stride).floor() as usize).min(page_count.saturating_sub(1))
}
