//! Sheetflow: paginated preview core for flowing documents
//!
//! This crate turns a single continuous content tree into fixed-size page
//! sheets:
//! - Overflow analysis that pushes short fragments across page boundaries
//! - Adjustment stylesheets keyed by structural paths
//! - Page allocation with one clipped content clone per page
//! - Host-clock scheduling with debounced, superseding passes

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod layout;
pub mod render;
pub mod schedule;
pub mod style;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmPaginator;

// Re-export primary types
pub use config::ReflowConfig;
pub use document::{ContentNode, ContentTree, NodeId, StructuralPath};
pub use engine::{PreparedPass, ReflowEngine, ReflowResult};
pub use error::{ReflowError, Result};
pub use layout::{FlowSurface, FontMetrics, Measurement, MeasurementSurface, PageSlot};
pub use render::{DisplayItem, DisplayList, DisplayPage};
pub use schedule::{Completion, PassTicket, ReflowScheduler, Trigger};
pub use style::{Adjustment, AdjustmentSheet};

/// Page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Page rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// A pagination session: the content snapshot, the engine measuring it,
/// the scheduler deciding when to reflow, and the last good result.
///
/// A failed or superseded pass never replaces the published result.
pub struct Paginator<S> {
    tree: ContentTree,
    engine: ReflowEngine<S>,
    scheduler: ReflowScheduler,
    result: ReflowResult,
    pending: Option<(PassTicket, PreparedPass)>,
    style_override: Option<String>,
}

impl<S: MeasurementSurface> Paginator<S> {
    /// Create a session over `content`
    pub fn new(content: &ContentNode, surface: S, config: ReflowConfig) -> Result<Self> {
        let scheduler = ReflowScheduler::new(&config);
        let result = ReflowResult::initial(&config);
        let engine = ReflowEngine::new(surface, config)?;

        Ok(Self {
            tree: ContentTree::from_node(content),
            engine,
            scheduler,
            result,
            pending: None,
            style_override: None,
        })
    }

    /// Replace the content; any pass still waiting for its frame is dropped
    pub fn set_content(&mut self, content: &ContentNode, now_ms: u64) {
        self.tree = ContentTree::from_node(content);
        self.invalidate_in_flight();
        self.scheduler.notify_content_resize(now_ms);
    }

    /// Inline style attached to every rendered content root
    pub fn set_style_override(&mut self, style: Option<String>, now_ms: u64) {
        self.style_override = style.filter(|s| !s.trim().is_empty());
        self.engine
            .surface_mut()
            .set_style_override(self.style_override.as_deref());
        self.scheduler.notify_content_resize(now_ms);
    }

    pub fn style_override(&self) -> Option<&str> {
        self.style_override.as_deref()
    }

    fn invalidate_in_flight(&mut self) {
        self.scheduler.supersede();
        self.pending = None;
    }

    /// Start observing; the first pass runs after the settle delay
    pub fn mount(&mut self, now_ms: u64) {
        self.scheduler.mount(now_ms);
    }

    pub fn notify_content_resize(&mut self, now_ms: u64) {
        self.scheduler.notify_content_resize(now_ms);
    }

    pub fn notify_viewport_resize(&mut self, now_ms: u64) {
        self.scheduler.notify_viewport_resize(now_ms);
    }

    /// Timer callback. Begins a pass when one is due; returns whether the
    /// host should request an animation frame.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let Some(ticket) = self.scheduler.poll(now_ms) else {
            return false;
        };

        match self.engine.begin_pass(&self.tree) {
            Ok(prepared) => {
                log::debug!("reflow pass {} started ({:?})", ticket.generation, ticket.trigger);
                self.pending = Some((ticket, prepared));
                true
            }
            Err(err) => {
                log::warn!("reflow pass {} failed to start: {}", ticket.generation, err);
                self.scheduler.finish(ticket);
                false
            }
        }
    }

    /// Stylesheet the host should inject: the in-flight pass's corrections
    /// once computed, otherwise the published ones
    pub fn injected_styles(&self) -> &str {
        match &self.pending {
            Some((_, prepared)) => &prepared.adjustment_styles,
            None => &self.result.adjustment_styles,
        }
    }

    /// Whether a pass is waiting for the next frame
    pub fn wants_frame(&self) -> bool {
        self.pending.is_some()
    }

    /// Frame callback. Finishes the pending pass and returns whether a new
    /// result was published.
    pub fn on_frame(&mut self) -> bool {
        let Some((ticket, prepared)) = self.pending.take() else {
            return false;
        };

        let outcome = self.engine.complete_pass(&self.tree, prepared);
        match (self.scheduler.finish(ticket), outcome) {
            (Completion::Current, Ok(result)) => {
                self.result = result;
                true
            }
            (Completion::Current, Err(err)) => {
                log::warn!("reflow pass {} failed, keeping previous result: {}", ticket.generation, err);
                false
            }
            (Completion::Superseded, _) => false,
        }
    }

    /// Earliest pending timer deadline. A deadline in the past means a
    /// queued rerun is ready for the next `tick`.
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    /// Whether a rerun is waiting for the in-flight pass
    pub fn has_queued_pass(&self) -> bool {
        self.scheduler.has_queued_pass()
    }

    /// Release timers and observation. The last result stays readable.
    pub fn teardown(&mut self) {
        self.scheduler.teardown();
        self.pending = None;
    }

    pub fn is_torn_down(&self) -> bool {
        self.scheduler.is_torn_down()
    }

    /// Run a full pass immediately, bypassing the scheduler
    pub fn reflow_now(&mut self) -> Result<&ReflowResult> {
        self.invalidate_in_flight();
        self.result = self.engine.run_pass(&self.tree)?;
        Ok(&self.result)
    }

    pub fn result(&self) -> &ReflowResult {
        &self.result
    }

    pub fn page_count(&self) -> usize {
        self.result.page_count
    }

    pub fn content_height(&self) -> f32 {
        self.result.content_height
    }

    pub fn slots(&self) -> &[PageSlot] {
        &self.result.slots
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    pub fn config(&self) -> &ReflowConfig {
        self.engine.config()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.engine.surface_mut()
    }

    /// Display list for the published result
    pub fn display_list(&self, viewport: Option<Rect>) -> DisplayList {
        DisplayList::build(&self.result, self.config(), viewport)
    }

    /// Paginated HTML for the published result
    pub fn render_html(&self) -> String {
        render::render_pages(&self.tree, &self.result, self.config(), self.style_override())
    }

    /// Hidden measurement copy for browser surfaces
    pub fn measurement_html(&self) -> String {
        render::measurement_host(&self.tree, self.config(), self.style_override())
    }

    pub fn scroll_offset_for_page(&self, index: usize) -> f32 {
        layout::scroll_offset_for_page(index, self.config())
    }

    pub fn page_at_scroll_offset(&self, y: f32) -> usize {
        layout::page_at_scroll_offset(y, self.result.page_count, self.config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BoxStyle;
    use crate::layout::AdjustedTree;

    fn fixed(text: &str, height: f32) -> ContentNode {
        ContentNode::text("p", text).with_style(BoxStyle::fixed(height))
    }

    fn resume(heights: &[f32]) -> ContentNode {
        ContentNode::new("div")
            .with_style(BoxStyle::flush())
            .with_children(heights.iter().map(|&h| fixed("entry", h)))
    }

    fn session(content: &ContentNode) -> Paginator<FlowSurface> {
        Paginator::new(content, FlowSurface::default(), ReflowConfig::default()).unwrap()
    }

    /// Surface that can be switched to fail
    struct Flaky {
        inner: FlowSurface,
        fail: bool,
    }

    impl MeasurementSurface for Flaky {
        fn measure(&mut self, tree: &AdjustedTree<'_>, width: f32) -> Result<Measurement> {
            if self.fail {
                return Err(ReflowError::Surface("host detached".into()));
            }
            self.inner.measure(tree, width)
        }
    }

    #[test]
    fn test_scheduled_pass() {
        let mut p = session(&resume(&[1100.0, 80.0]));
        assert_eq!(p.page_count(), 1);

        p.mount(0);
        assert!(!p.tick(50));
        assert!(p.tick(100));
        assert!(p.wants_frame());
        assert!(p.injected_styles().contains("margin-top: 23px"));
        assert_eq!(p.page_count(), 1);

        assert!(p.on_frame());
        assert!(!p.wants_frame());
        assert_eq!(p.page_count(), 2);
        assert_eq!(p.content_height(), 1203.0);
        assert_eq!(p.slots()[1].height, 80.0);
        assert_eq!(p.injected_styles(), p.result().adjustment_styles);
    }

    #[test]
    fn test_failed_pass_keeps_previous_result() {
        let surface = Flaky {
            inner: FlowSurface::default(),
            fail: false,
        };
        let mut p = Paginator::new(&resume(&[1100.0, 80.0]), surface, ReflowConfig::default()).unwrap();
        p.mount(0);
        p.tick(100);
        assert!(p.on_frame());
        let good = p.result().clone();

        p.surface_mut().fail = true;
        p.notify_content_resize(200);
        assert!(!p.tick(350));
        assert!(!p.wants_frame());
        assert_eq!(p.result(), &good);

        // Fails between the two halves of a pass
        p.surface_mut().fail = false;
        p.notify_viewport_resize(400);
        assert!(p.tick(550));
        p.surface_mut().fail = true;
        assert!(!p.on_frame());
        assert_eq!(p.result(), &good);
    }

    #[test]
    fn test_set_content_supersedes_in_flight_pass() {
        let mut p = session(&resume(&[1100.0, 80.0]));
        p.mount(0);
        assert!(p.tick(100));

        p.set_content(&resume(&[500.0]), 110);
        assert!(!p.wants_frame());
        assert!(!p.on_frame());
        assert_eq!(p.page_count(), 1);

        assert!(p.tick(260));
        assert!(p.on_frame());
        assert_eq!(p.content_height(), 500.0);
        assert_eq!(p.result().adjustment_count, 0);
    }

    #[test]
    fn test_teardown_drops_pass_and_timers() {
        let mut p = session(&resume(&[1100.0, 80.0]));
        p.mount(0);
        assert!(p.tick(100));

        p.teardown();
        assert!(p.is_torn_down());
        assert!(!p.on_frame());
        assert_eq!(p.next_deadline(), None);

        p.notify_content_resize(200);
        assert!(!p.tick(10_000));
        assert_eq!(p.page_count(), 1);
    }

    #[test]
    fn test_reflow_now_and_render() {
        let mut p = session(&resume(&[1100.0, 80.0, 900.0]));
        p.set_style_override(Some("font-family:serif;".into()), 0);
        let result = p.reflow_now().unwrap();
        assert_eq!(result.page_count, 2);

        let html = p.render_html();
        assert_eq!(html.matches("class=\"reflow-content\"").count(), 2);
        assert!(html.contains("font-family:serif;"));
        assert!(p.measurement_html().contains("aria-hidden=\"true\""));

        assert_eq!(p.scroll_offset_for_page(1), 1147.0);
        assert_eq!(p.page_at_scroll_offset(1200.0), 1);
        assert_eq!(p.display_list(None).pages.len(), 2);
    }

    #[test]
    fn test_host_loop_driven_by_deadlines_runs_queued_rerun() {
        let entries = (0..60).map(|i| ContentNode::text("p", format!("Entry {}", i)));
        let mut p = session(&ContentNode::new("div").with_children(entries));

        p.mount(0);
        assert!(p.tick(100));

        // Metrics change while the first pass waits for its frame
        let taller = FontMetrics::monospace(40.0, 7.0);
        p.surface_mut().set_metrics(taller.clone());
        p.notify_viewport_resize(110);
        assert!(!p.tick(260));
        assert!(p.has_queued_pass());
        assert!(p.on_frame());

        // The host only knows what next_deadline tells it
        let mut now = 260;
        for _ in 0..10 {
            let Some(deadline) = p.next_deadline() else {
                break;
            };
            now = now.max(deadline);
            if p.tick(now) {
                p.on_frame();
            }
        }

        assert!(!p.has_queued_pass());
        let mut fresh = ReflowEngine::new(FlowSurface::new(taller), ReflowConfig::default()).unwrap();
        assert_eq!(p.result(), &fresh.run_pass(p.tree()).unwrap());
    }

    #[test]
    fn test_too_tall_content_keeps_previous_result() {
        let mut p = session(&resume(&[1100.0, 80.0]));
        p.reflow_now().unwrap();
        let good = p.result().clone();

        p.set_content(&resume(&[1.0e30]), 0);
        let err = p.reflow_now().unwrap_err();
        assert!(matches!(err, ReflowError::ContentTooTall { .. }));
        assert_eq!(p.result(), &good);
    }

    /// Surface that records the style override it was handed
    #[derive(Default)]
    struct Styled {
        inner: FlowSurface,
        style: Option<String>,
    }

    impl MeasurementSurface for Styled {
        fn measure(&mut self, tree: &AdjustedTree<'_>, width: f32) -> Result<Measurement> {
            self.inner.measure(tree, width)
        }

        fn set_style_override(&mut self, style: Option<&str>) {
            self.style = style.map(str::to_string);
        }
    }

    #[test]
    fn test_style_override_reaches_surface() {
        let mut p = Paginator::new(&resume(&[100.0]), Styled::default(), ReflowConfig::default()).unwrap();
        p.set_style_override(Some("font-size:18px;".into()), 0);
        assert_eq!(p.surface_mut().style.as_deref(), Some("font-size:18px;"));

        p.set_style_override(Some("  ".into()), 0);
        assert_eq!(p.surface_mut().style, None);
    }

    #[test]
    fn test_rect_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(0.0, 10.0, 10.0, 10.0)));
    }
}
