//! Adjustment accumulation and stylesheet output
//!
//! Corrections leave the analyzer as path-addressed shifts and are turned
//! into one rule each, scoped under the content-root class, so the same
//! sheet applies to the measurement copy and to every page clone.

use crate::document::StructuralPath;
use rustc_hash::FxHashMap;
use std::fmt::Write;

/// A downward shift applied to one block to avoid a page-boundary split
#[derive(Debug, Clone, PartialEq)]
pub struct Adjustment {
    pub path: StructuralPath,
    /// Shift in logical pixels
    pub pixels: f32,
    /// The block's own top margin before the shift
    pub base_margin: f32,
}

impl Adjustment {
    pub fn new(path: StructuralPath, pixels: f32) -> Self {
        Self {
            path,
            pixels,
            base_margin: 0.0,
        }
    }

    /// Effective top margin once the shift is applied
    pub fn margin_top(&self) -> f32 {
        self.base_margin + self.pixels
    }
}

/// Path-keyed set of adjustments
#[derive(Debug, Clone, Default)]
pub struct AdjustmentSheet {
    entries: Vec<Adjustment>,
    index: FxHashMap<StructuralPath, usize>,
}

impl AdjustmentSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_adjustments(adjustments: impl IntoIterator<Item = Adjustment>) -> Self {
        let mut sheet = Self::new();
        for adjustment in adjustments {
            sheet.add(adjustment);
        }
        sheet
    }

    /// Record an adjustment; shifts for the same path accumulate
    pub fn add(&mut self, adjustment: Adjustment) {
        if adjustment.path.is_empty() || !adjustment.pixels.is_finite() {
            return;
        }
        match self.index.get(&adjustment.path) {
            Some(&slot) => self.entries[slot].pixels += adjustment.pixels,
            None => {
                self.index.insert(adjustment.path.clone(), self.entries.len());
                self.entries.push(adjustment);
            }
        }
    }

    /// Accumulated shift for a path
    pub fn shift_for(&self, path: &StructuralPath) -> Option<f32> {
        self.index.get(path).map(|&slot| self.entries[slot].pixels)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Adjustment> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_pixels(&self) -> f32 {
        self.entries.iter().map(|a| a.pixels).sum()
    }

    /// Render one rule per adjustment, in insertion order
    pub fn to_css(&self, root_class: &str) -> String {
        let mut css = String::new();
        for adjustment in &self.entries {
            let _ = writeln!(
                css,
                "{} {{ margin-top: {}px !important; }}",
                adjustment.path.selector(root_class),
                adjustment.margin_top()
            );
        }
        css
    }
}
