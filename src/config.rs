//! Reflow session configuration

use crate::error::{ReflowError, Result};
use serde::{Deserialize, Serialize};

/// A4 width at 96 DPI
pub const PAGE_WIDTH: f32 = 794.0;

/// A4 height at 96 DPI
pub const PAGE_HEIGHT: f32 = 1123.0;

/// Fragments shorter than this on either side of a page break are orphans
pub const MIN_ELEMENT_HEIGHT: f32 = 60.0;

/// Floor for the height of the last page slot
pub const MIN_VISIBLE_HEIGHT: f32 = 24.0;

/// Vertical gap between rendered sheets in the scroll column
pub const INTER_PAGE_GAP: f32 = 24.0;

/// Upper bound on the number of page slots a pass may produce
pub const MAX_PAGES: usize = 1000;

/// Class carried by the content root in every rendered copy
pub const CONTENT_ROOT_CLASS: &str = "reflow-content";

/// Configuration for a reflow session.
///
/// Page dimensions are fixed for the lifetime of a session; build a new
/// [`crate::Paginator`] to change them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReflowConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub min_element_height: f32,
    pub min_visible_height: f32,
    pub inter_page_gap: f32,
    /// Passes whose content needs more pages than this are rejected
    pub max_pages: usize,
    /// Delay after mount before the first pass
    pub settle_delay_ms: u64,
    /// Quiet period used to coalesce resize notifications
    pub debounce_ms: u64,
    pub content_root_class: String,
}

impl Default for ReflowConfig {
    fn default() -> Self {
        Self {
            page_width: PAGE_WIDTH,
            page_height: PAGE_HEIGHT,
            min_element_height: MIN_ELEMENT_HEIGHT,
            min_visible_height: MIN_VISIBLE_HEIGHT,
            inter_page_gap: INTER_PAGE_GAP,
            max_pages: MAX_PAGES,
            settle_delay_ms: 100,
            debounce_ms: 150,
            content_root_class: CONTENT_ROOT_CLASS.to_string(),
        }
    }
}

impl ReflowConfig {
    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ReflowConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject dimensions the allocator and analyzer cannot work with
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("pageWidth", self.page_width),
            ("pageHeight", self.page_height),
            ("minElementHeight", self.min_element_height),
            ("minVisibleHeight", self.min_visible_height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ReflowError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if !(self.inter_page_gap.is_finite() && self.inter_page_gap >= 0.0) {
            return Err(ReflowError::InvalidConfig(format!(
                "interPageGap must not be negative, got {}",
                self.inter_page_gap
            )));
        }

        if self.max_pages == 0 {
            return Err(ReflowError::InvalidConfig("maxPages must be at least 1".into()));
        }

        let class_ok = !self.content_root_class.is_empty()
            && self
                .content_root_class
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !class_ok {
            return Err(ReflowError::InvalidConfig(format!(
                "contentRootClass is not a plain class name: {:?}",
                self.content_root_class
            )));
        }

        Ok(())
    }

    /// Largest block the analyzer will push whole onto the next page
    pub fn max_pushable_height(&self) -> f32 {
        3.0 * self.min_element_height
    }
}
