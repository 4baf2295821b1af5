//! Display list: one clipped window into the shared content per page

use crate::config::ReflowConfig;
use crate::engine::ReflowResult;
use crate::layout::{scroll_offset_for_page, PageSlot};
use crate::{Point, Rect};

/// Distance of the page-number annotation from the sheet's bottom edge
const PAGE_NUMBER_INSET: f32 = 24.0;

/// A display item to render inside a page
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayItem {
    /// Background sheet surface, drawn first
    Sheet { rect: Rect, shadow: bool },
    /// A full clone of the corrected content, translated so the page's
    /// slice lines up with the top of the clip
    ContentClone { instance: usize, translate_y: f32 },
    /// "n / total" annotation; never part of an export
    PageNumber {
        position: Point,
        number: usize,
        total: usize,
        exportable: bool,
    },
}

/// Display list for a single page
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayPage {
    pub page_index: usize,
    /// Sheet position in the scroll column
    pub bounds: Rect,
    /// Clip rectangle in page coordinates
    pub clip: Rect,
    pub slot: PageSlot,
    pub items: Vec<DisplayItem>,
}

impl DisplayPage {
    /// Vertical offset applied to this page's content clone
    pub fn content_offset(&self) -> f32 {
        self.items
            .iter()
            .find_map(|item| match item {
                DisplayItem::ContentClone { translate_y, .. } => Some(*translate_y),
                _ => None,
            })
            .unwrap_or(0.0)
    }
}

/// Complete display list for rendering
#[derive(Debug, Clone)]
pub struct DisplayList {
    pub page_count: usize,
    pub pages: Vec<DisplayPage>,
}

impl DisplayList {
    /// Build display pages for every slot.
    ///
    /// Each page holds its own content clone, so memory grows with
    /// `page_count x tree size`. Pass a viewport to only build the pages it
    /// overlaps.
    pub fn build(result: &ReflowResult, config: &ReflowConfig, viewport: Option<Rect>) -> Self {
        let total = result.slots.len().max(1);
        let mut pages = Vec::new();

        for slot in &result.slots {
            let bounds = Rect::new(
                0.0,
                scroll_offset_for_page(slot.index, config),
                config.page_width,
                config.page_height,
            );

            // Skip pages outside viewport
            if let Some(viewport) = viewport {
                if !bounds.intersects(&viewport) {
                    continue;
                }
            }

            // Page n shows content from n * page_height
            let offset = slot.index as f32 * config.page_height;
            let mut items = vec![
                DisplayItem::Sheet {
                    rect: Rect::new(0.0, 0.0, config.page_width, config.page_height),
                    shadow: true,
                },
                DisplayItem::ContentClone {
                    instance: slot.index,
                    translate_y: if offset > 0.0 { -offset } else { 0.0 },
                },
            ];

            if total > 1 {
                items.push(DisplayItem::PageNumber {
                    position: Point {
                        x: config.page_width / 2.0,
                        y: config.page_height - PAGE_NUMBER_INSET,
                    },
                    number: slot.index + 1,
                    total,
                    exportable: false,
                });
            }

            pages.push(DisplayPage {
                page_index: slot.index,
                bounds,
                clip: Rect::new(0.0, 0.0, config.page_width, config.page_height),
                slot: *slot,
                items,
            });
        }

        DisplayList {
            page_count: total,
            pages,
        }
    }
}

/// Display pages for every slot, no culling
pub fn compose_pages(result: &ReflowResult, config: &ReflowConfig) -> Vec<DisplayPage> {
    DisplayList::build(result, config, None).pages
}
