//! Reflow pass: measure, analyze, adjust, re-measure, allocate

use crate::config::ReflowConfig;
use crate::document::ContentTree;
use crate::error::{ReflowError, Result};
use crate::layout::{
    allocate_pages, apply_adjustments, compute_adjustments, measured_blocks, page_count,
    AdjustedTree, Measurement, MeasurementSurface, PageMetrics, PageSlot,
};
use crate::style::AdjustmentSheet;
use serde::Serialize;

/// Externally visible state produced by one reflow pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflowResult {
    pub page_count: usize,
    /// Corrected content height
    pub content_height: f32,
    /// Content height before adjustments
    pub raw_content_height: f32,
    /// Stylesheet carrying one rule per adjustment
    pub adjustment_styles: String,
    pub adjustment_count: usize,
    pub slots: Vec<PageSlot>,
}

impl ReflowResult {
    /// Placeholder shown before the first pass completes
    pub fn initial(config: &ReflowConfig) -> Self {
        Self {
            page_count: 1,
            content_height: 0.0,
            raw_content_height: 0.0,
            adjustment_styles: String::new(),
            adjustment_count: 0,
            slots: allocate_pages(0.0, config),
        }
    }
}

/// First half of a pass: corrections computed against unadjusted geometry
#[derive(Debug, Clone)]
pub struct PreparedPass {
    pub sheet: AdjustmentSheet,
    pub adjustment_styles: String,
    pub raw_content_height: f32,
}

/// Runs reflow passes against a measurement surface
#[derive(Debug)]
pub struct ReflowEngine<S> {
    surface: S,
    config: ReflowConfig,
}

impl<S: MeasurementSurface> ReflowEngine<S> {
    pub fn new(surface: S, config: ReflowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { surface, config })
    }

    pub fn config(&self) -> &ReflowConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Reject measurements that are not laid out yet or that would need
    /// more pages than allowed
    fn check_measurement(&self, measurement: &Measurement) -> Result<()> {
        let height = measurement.scroll_height();
        if !measurement.is_ready() {
            return Err(ReflowError::MeasurementNotReady { height });
        }
        if page_count(height, self.config.page_height) > self.config.max_pages {
            return Err(ReflowError::ContentTooTall {
                height,
                max_pages: self.config.max_pages,
            });
        }
        Ok(())
    }

    /// Measure the unadjusted tree and compute the adjustment sheet
    pub fn begin_pass(&mut self, tree: &ContentTree) -> Result<PreparedPass> {
        let raw = self
            .surface
            .measure(&AdjustedTree::unadjusted(tree), self.config.page_width)?;
        self.check_measurement(&raw)?;

        let blocks = measured_blocks(tree, &raw);
        let adjustments = compute_adjustments(&blocks, &PageMetrics::from(&self.config));
        let sheet = AdjustmentSheet::from_adjustments(adjustments);
        let adjustment_styles = sheet.to_css(&self.config.content_root_class);

        log::debug!(
            "reflow analysis: {} leaf blocks, {} adjustments, raw height {}",
            blocks.len(),
            sheet.len(),
            raw.scroll_height()
        );

        Ok(PreparedPass {
            sheet,
            adjustment_styles,
            raw_content_height: raw.scroll_height(),
        })
    }

    /// Apply the prepared corrections, re-measure and allocate pages
    pub fn complete_pass(&mut self, tree: &ContentTree, prepared: PreparedPass) -> Result<ReflowResult> {
        let adjusted = apply_adjustments(tree, &prepared.sheet);
        let measured = self.surface.measure(&adjusted, self.config.page_width)?;
        self.check_measurement(&measured)?;

        let content_height = measured.scroll_height();
        let slots = allocate_pages(content_height, &self.config);

        log::debug!(
            "reflow complete: {} pages, height {} (raw {})",
            slots.len(),
            content_height,
            prepared.raw_content_height
        );

        Ok(ReflowResult {
            page_count: slots.len(),
            content_height,
            raw_content_height: prepared.raw_content_height,
            adjustment_count: prepared.sheet.len(),
            adjustment_styles: prepared.adjustment_styles,
            slots,
        })
    }

    /// Both halves of a pass without waiting for a frame in between
    pub fn run_pass(&mut self, tree: &ContentTree) -> Result<ReflowResult> {
        let prepared = self.begin_pass(tree)?;
        self.complete_pass(tree, prepared)
    }
}
