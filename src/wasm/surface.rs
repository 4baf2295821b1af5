//! Measurement surfaces available to JS hosts

use crate::error::{ReflowError, Result};
use crate::layout::{AdjustedTree, FlowSurface, HostMeasurement, Measurement, MeasurementSurface};
use crate::render::measurement_markup;
use wasm_bindgen::JsValue;

/// Surface backed by a host callback that lays the content out in a hidden
/// DOM node.
///
/// The callback is invoked as `measure(markup, stylesheet, width)` and must
/// return a [`HostMeasurement`] JSON string with boxes keyed by structural
/// path.
pub struct CallbackSurface {
    measure: js_sys::Function,
    root_class: String,
    style_override: Option<String>,
}

impl CallbackSurface {
    pub fn new(measure: js_sys::Function, root_class: impl Into<String>) -> Self {
        Self {
            measure,
            root_class: root_class.into(),
            style_override: None,
        }
    }
}

impl MeasurementSurface for CallbackSurface {
    fn measure(&mut self, adjusted: &AdjustedTree<'_>, width: f32) -> Result<Measurement> {
        let tree = adjusted.tree();
        let markup = measurement_markup(tree, &self.root_class, width, self.style_override.as_deref());
        let stylesheet = adjusted.stylesheet(&self.root_class);

        let reply = self
            .measure
            .call3(
                &JsValue::NULL,
                &JsValue::from_str(&markup),
                &JsValue::from_str(&stylesheet),
                &JsValue::from_f64(f64::from(width)),
            )
            .map_err(|err| ReflowError::Surface(format!("measure callback threw: {:?}", err)))?;
        let json = reply
            .as_string()
            .ok_or_else(|| ReflowError::Surface("measure callback must return a JSON string".into()))?;

        Ok(HostMeasurement::from_json(&json)?.resolve(tree))
    }

    fn set_style_override(&mut self, style: Option<&str>) {
        self.style_override = style.map(str::to_string);
    }
}

/// The surface a [`super::WasmPaginator`] measures with
pub enum BridgeSurface {
    /// Built-in block flow with synthetic font metrics
    Flow(FlowSurface),
    /// Real DOM geometry reported by the host
    Host(CallbackSurface),
}

impl MeasurementSurface for BridgeSurface {
    fn measure(&mut self, tree: &AdjustedTree<'_>, width: f32) -> Result<Measurement> {
        match self {
            BridgeSurface::Flow(surface) => surface.measure(tree, width),
            BridgeSurface::Host(surface) => surface.measure(tree, width),
        }
    }

    fn set_style_override(&mut self, style: Option<&str>) {
        match self {
            BridgeSurface::Flow(surface) => surface.set_style_override(style),
            BridgeSurface::Host(surface) => surface.set_style_override(style),
        }
    }
}
