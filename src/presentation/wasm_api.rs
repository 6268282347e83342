use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use gloo::timers::callback::Timeout;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::application::chart_service::ChartEngine;
use crate::domain::{
    chart::{DeviceClass, Margins, PointerEvent, Viewport, ViewportOrigin},
    logging::LogComponent,
};
use crate::{log_debug, log_warn};

/// Resize bursts are coalesced into one recomputation after this quiet period
pub const RESIZE_DEBOUNCE_MS: u32 = 150;

const COMPONENT: LogComponent = LogComponent::Presentation("PredictionChartApi");

/// JS bridge to the chart engine. Holds no logic of its own besides the
/// resize debounce.
#[wasm_bindgen]
pub struct PredictionChartApi {
    engine: Rc<RefCell<ChartEngine>>,
    pending_resize: Option<Timeout>,
}

impl Default for PredictionChartApi {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl PredictionChartApi {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { engine: Rc::new(RefCell::new(ChartEngine::new())), pending_resize: None }
    }

    /// Main and optional after series, as arrays or JSON-encoded strings
    #[wasm_bindgen(js_name = loadSeries)]
    pub fn load_series(&mut self, main_json: &str, after_json: Option<String>) -> Result<(), JsValue> {
        self.engine
            .borrow_mut()
            .load_json(main_json, after_json.as_deref())
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = setChartType)]
    pub fn set_chart_type(&mut self, chart_type: &str) -> Result<(), JsValue> {
        self.engine.borrow_mut().set_chart_type(chart_type).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, zoom_pct: f64) {
        self.engine.borrow_mut().set_zoom(zoom_pct);
    }

    #[wasm_bindgen(js_name = setProgress)]
    pub fn set_progress(&mut self, progress_pct: f64) {
        self.engine.borrow_mut().set_progress(progress_pct);
    }

    /// Prediction mode appends selection slots past the last candle
    #[wasm_bindgen(js_name = setPredictionMode)]
    pub fn set_prediction_mode(&mut self, enabled: bool) {
        self.engine.borrow_mut().set_selection_extension(enabled);
    }

    /// Apply a measured container size right away
    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(&mut self, width: f64, height: f64, is_mobile: bool) {
        self.pending_resize = None;
        let mut engine = self.engine.borrow_mut();
        let margins = engine.viewport().margins;
        let device = if is_mobile { DeviceClass::Mobile } else { DeviceClass::Desktop };
        engine.set_viewport(Viewport::new(width, height).with_margins(margins).with_device(device));
    }

    #[wasm_bindgen(js_name = setMargins)]
    pub fn set_margins(&mut self, top: f64, right: f64, bottom: f64, left: f64) {
        self.engine.borrow_mut().set_margins(Margins::new(top, right, bottom, left));
    }

    /// Debounced size update for resize observers. A newer call cancels the
    /// pending one.
    pub fn resize(&mut self, width: f64, height: f64) {
        let engine = Rc::clone(&self.engine);
        self.pending_resize = Some(Timeout::new(RESIZE_DEBOUNCE_MS, move || {
            match engine.try_borrow_mut() {
                Ok(mut engine) => {
                    engine.set_size(width, height);
                    log_debug!(COMPONENT, "resized to {}x{}", width, height);
                }
                Err(_) => {
                    log_warn!(COMPONENT, "engine busy, dropped resize to {}x{}", width, height);
                }
            }
        }));
    }

    /// Scales and geometry of the current inputs as a plain JS object
    pub fn frame(&mut self) -> Result<JsValue, JsValue> {
        let mut engine = self.engine.borrow_mut();
        let frame = engine.frame().map_err(to_js_error)?;
        to_js_value(frame)
    }

    /// `{index, price, extrapolated}` or `null` outside the selectable region
    #[wasm_bindgen(js_name = mapPointer)]
    pub fn map_pointer(
        &mut self,
        client_x: f64,
        client_y: f64,
        origin_left: f64,
        origin_top: f64,
    ) -> Result<JsValue, JsValue> {
        let selection = self.engine.borrow_mut().map_pointer(
            &PointerEvent::new(client_x, client_y),
            &ViewportOrigin::new(origin_left, origin_top),
        );
        match selection {
            Some(selection) => to_js_value(&selection),
            None => Ok(JsValue::NULL),
        }
    }
}

fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(to_js_error)?;
    js_sys::JSON::parse(&json)
}

fn to_js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
