//! WASM bindings for the paginator

mod surface;

pub use surface::{BridgeSurface, CallbackSurface};

use crate::config::{ReflowConfig, PAGE_HEIGHT, PAGE_WIDTH};
use crate::document::ContentNode;
use crate::layout::{FlowSurface, FontMetrics};
use crate::{Paginator, ReflowError};
use wasm_bindgen::prelude::*;

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // Fails only when a logger is already installed
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Warn);
}

/// A4 width at 96 DPI
#[wasm_bindgen(js_name = pageWidth)]
pub fn page_width() -> f32 {
    PAGE_WIDTH
}

/// A4 height at 96 DPI
#[wasm_bindgen(js_name = pageHeight)]
pub fn page_height() -> f32 {
    PAGE_HEIGHT
}

fn to_js(err: ReflowError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Host clock; callers may pass their own timestamp instead
fn now_ms(now: Option<f64>) -> u64 {
    let now = now.unwrap_or_else(js_sys::Date::now);
    if now.is_finite() && now > 0.0 {
        now as u64
    } else {
        0
    }
}

/// WASM-exposed pagination session
#[wasm_bindgen]
pub struct WasmPaginator {
    paginator: Paginator<BridgeSurface>,
}

fn parse_session(content_json: &str, config_json: Option<String>) -> Result<(ContentNode, ReflowConfig), JsValue> {
    let content = ContentNode::from_json(content_json).map_err(to_js)?;
    let config = match config_json {
        Some(json) => ReflowConfig::from_json(&json).map_err(to_js)?,
        None => ReflowConfig::default(),
    };
    Ok((content, config))
}

#[wasm_bindgen]
impl WasmPaginator {
    /// Create a session from a JSON content tree and optional JSON config,
    /// measured with the built-in flow surface
    #[wasm_bindgen(constructor)]
    pub fn new(content_json: &str, config_json: Option<String>) -> Result<WasmPaginator, JsValue> {
        let (content, config) = parse_session(content_json, config_json)?;
        let surface = BridgeSurface::Flow(FlowSurface::default());
        let paginator = Paginator::new(&content, surface, config).map_err(to_js)?;
        Ok(Self { paginator })
    }

    /// Create a session measured by the host DOM.
    ///
    /// `measure(markup, stylesheet, width)` renders the hidden copy with the
    /// stylesheet applied and returns `{ scrollHeight, boxes: [{ path, top,
    /// height, marginTop }] }` as a JSON string.
    #[wasm_bindgen(js_name = withHostSurface)]
    pub fn with_host_surface(
        content_json: &str,
        config_json: Option<String>,
        measure: js_sys::Function,
    ) -> Result<WasmPaginator, JsValue> {
        let (content, config) = parse_session(content_json, config_json)?;
        let surface = BridgeSurface::Host(CallbackSurface::new(measure, config.content_root_class.clone()));
        let paginator = Paginator::new(&content, surface, config).map_err(to_js)?;
        Ok(Self { paginator })
    }

    /// Replace the content tree
    #[wasm_bindgen(js_name = setContent)]
    pub fn set_content(&mut self, content_json: &str, now: Option<f64>) -> Result<(), JsValue> {
        let content = ContentNode::from_json(content_json).map_err(to_js)?;
        self.paginator.set_content(&content, now_ms(now));
        Ok(())
    }

    /// Inline CSS attached to every content root; empty clears it
    #[wasm_bindgen(js_name = setStyleOverride)]
    pub fn set_style_override(&mut self, style: Option<String>, now: Option<f64>) {
        self.paginator.set_style_override(style, now_ms(now));
    }

    /// Replace the font metrics used by the built-in surface
    #[wasm_bindgen(js_name = setFontMetrics)]
    pub fn set_font_metrics(&mut self, metrics_json: &str, now: Option<f64>) -> Result<(), JsValue> {
        let metrics: FontMetrics = serde_json::from_str(metrics_json)
            .map_err(|e| to_js(ReflowError::from(e)))?;
        match self.paginator.surface_mut() {
            BridgeSurface::Flow(surface) => surface.set_metrics(metrics),
            BridgeSurface::Host(_) => {
                return Err(JsValue::from_str("font metrics only apply to the built-in surface"));
            }
        }
        self.paginator.notify_content_resize(now_ms(now));
        Ok(())
    }

    pub fn mount(&mut self, now: Option<f64>) {
        self.paginator.mount(now_ms(now));
    }

    #[wasm_bindgen(js_name = notifyContentResize)]
    pub fn notify_content_resize(&mut self, now: Option<f64>) {
        self.paginator.notify_content_resize(now_ms(now));
    }

    #[wasm_bindgen(js_name = notifyViewportResize)]
    pub fn notify_viewport_resize(&mut self, now: Option<f64>) {
        self.paginator.notify_viewport_resize(now_ms(now));
    }

    /// Timer callback; returns true when an animation frame should be requested
    pub fn tick(&mut self, now: Option<f64>) -> bool {
        self.paginator.tick(now_ms(now))
    }

    /// Frame callback; returns true when a new result was published
    #[wasm_bindgen(js_name = animationFrame)]
    pub fn animation_frame(&mut self) -> bool {
        self.paginator.on_frame()
    }

    /// Earliest timer deadline in host milliseconds, if any. A deadline in
    /// the past means `tick` should run right away.
    #[wasm_bindgen(js_name = nextDeadline)]
    pub fn next_deadline(&self) -> Option<f64> {
        self.paginator.next_deadline().map(|d| d as f64)
    }

    /// Whether a rerun is waiting for the in-flight pass
    #[wasm_bindgen(js_name = hasQueuedPass)]
    pub fn has_queued_pass(&self) -> bool {
        self.paginator.has_queued_pass()
    }

    pub fn teardown(&mut self) {
        self.paginator.teardown();
    }

    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.paginator.page_count()
    }

    #[wasm_bindgen(js_name = contentHeight)]
    pub fn content_height(&self) -> f32 {
        self.paginator.content_height()
    }

    /// Stylesheet to inject alongside the content
    #[wasm_bindgen(js_name = adjustmentStyles)]
    pub fn adjustment_styles(&self) -> String {
        self.paginator.injected_styles().to_string()
    }

    /// Page slots as a JSON array
    #[wasm_bindgen(js_name = pageSlots)]
    pub fn page_slots(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.paginator.slots()).map_err(|e| to_js(ReflowError::from(e)))
    }

    /// Full result as JSON
    #[wasm_bindgen(js_name = resultJson)]
    pub fn result_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.paginator.result()).map_err(|e| to_js(ReflowError::from(e)))
    }

    /// Paginated HTML for the current result
    #[wasm_bindgen(js_name = renderPages)]
    pub fn render_pages(&self) -> String {
        self.paginator.render_html()
    }

    /// Hidden measurement copy of the content
    #[wasm_bindgen(js_name = measurementHost)]
    pub fn measurement_host(&self) -> String {
        self.paginator.measurement_html()
    }

    #[wasm_bindgen(js_name = scrollOffsetForPage)]
    pub fn scroll_offset_for_page(&self, index: usize) -> f32 {
        self.paginator.scroll_offset_for_page(index)
    }

    #[wasm_bindgen(js_name = pageAtScrollOffset)]
    pub fn page_at_scroll_offset(&self, y: f32) -> usize {
        self.paginator.page_at_scroll_offset(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = r#"{
        "tag": "div",
        "style": { "marginTop": 0, "marginBottom": 0, "paddingTop": 0, "paddingBottom": 0 },
        "children": [
            { "tag": "p", "text": "Summary", "style": { "height": 1100, "marginTop": 0, "marginBottom": 0 } },
            { "tag": "p", "text": "Skills", "style": { "height": 80, "marginTop": 0, "marginBottom": 0 } }
        ]
    }"#;

    #[test]
    fn test_session_from_json() {
        let mut p = WasmPaginator::new(CONTENT, None).unwrap();
        p.mount(Some(1_000.0));
        assert!(p.tick(Some(1_100.0)));
        assert!(p.adjustment_styles().contains("p:nth-child(2)"));
        assert!(p.animation_frame());
        assert_eq!(p.page_count(), 2);
        assert_eq!(p.content_height(), 1203.0);
        assert!(p.page_slots().unwrap().starts_with("[{\"index\":0"));
    }

    #[test]
    fn test_config_json() {
        let p = WasmPaginator::new(CONTENT, Some(r#"{ "interPageGap": 40 }"#.into())).unwrap();
        assert_eq!(p.scroll_offset_for_page(1), 1163.0);
        assert_eq!(page_width(), 794.0);
        assert_eq!(page_height(), 1123.0);
    }

    #[test]
    fn test_clock_sanitized() {
        assert_eq!(now_ms(Some(-5.0)), 0);
        assert_eq!(now_ms(Some(f64::NAN)), 0);
        assert_eq!(now_ms(Some(250.9)), 250);
    }
}
