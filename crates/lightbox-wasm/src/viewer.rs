//! Viewer WASM bindings.
//!
//! The browser owns file access, so decodes are split in two: `render`
//! reports that a source is needed, the host reads it with `pending_load`,
//! fetches the bytes and hands them to `complete_load`.

use std::time::Duration;

use lightbox_core::{
    DecodeError, DecodeRequest, Direction, FilterField, FilterMode, RenderUpdate,
    SessionDocument, Viewer, ViewerError,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::console_warn;
use crate::types::{JsBitmap, JsLoadRequest};

fn to_js(err: ViewerError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// One row of the layer list shown by the overlay.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayerSummary<'a> {
    index: usize,
    path: &'a str,
    mode: &'static str,
    active: bool,
}

/// The overlay viewer for JavaScript
#[wasm_bindgen]
pub struct JsViewer {
    inner: Viewer,
    /// Decodes handed out by `render` that the host has not completed yet.
    loads: Vec<DecodeRequest>,
    /// Generation of the request not yet returned by `pending_load`.
    unclaimed: Option<u64>,
}

impl Default for JsViewer {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl JsViewer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: Viewer::new(),
            loads: Vec::new(),
            unclaimed: None,
        }
    }

    /// Add a dropped file. Only `image/png` and `image/jpeg` are accepted.
    ///
    /// Returns the new layer's index.
    pub fn add_layer(&mut self, path: &str, content_type: &str) -> Result<usize, JsValue> {
        self.inner.add_layer(path, content_type).map_err(to_js)
    }

    /// Number of layers
    #[wasm_bindgen(getter)]
    pub fn layer_count(&self) -> usize {
        self.inner.layers().len()
    }

    /// Index of the active layer, undefined when there are none
    #[wasm_bindgen(getter)]
    pub fn active_index(&self) -> Option<usize> {
        self.inner.layers().active_index()
    }

    /// The layers as `{index, path, mode, active}` objects.
    pub fn layers(&self) -> Result<JsValue, JsValue> {
        let active = self.inner.layers().active_index();
        let summaries: Vec<LayerSummary<'_>> = self
            .inner
            .layers()
            .layers()
            .iter()
            .enumerate()
            .map(|(index, layer)| LayerSummary {
                index,
                path: layer.source_path(),
                mode: layer.filter().mode.name(),
                active: active == Some(index),
            })
            .collect();
        serde_wasm_bindgen::to_value(&summaries).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn cycle_next(&mut self) -> Result<usize, JsValue> {
        self.inner.cycle_active_layer(Direction::Next).map_err(to_js)
    }

    pub fn cycle_previous(&mut self) -> Result<usize, JsValue> {
        self.inner
            .cycle_active_layer(Direction::Previous)
            .map_err(to_js)
    }

    /// Active layer's mode name: "normal", "threshold" or "threshold_inverted"
    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.inner.current_filter().mode.name().to_string()
    }

    /// Set the active layer's mode by name.
    pub fn set_mode(&mut self, name: &str) -> Result<(), JsValue> {
        let mode = FilterMode::from_name(name)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown filter mode: {}", name)))?;
        self.set_field(FilterField::Mode(mode))
    }

    /// Advance the active layer's mode and return its new name.
    pub fn cycle_mode(&mut self) -> Result<String, JsValue> {
        let filter = self.inner.cycle_mode().map_err(to_js)?;
        Ok(filter.mode.name().to_string())
    }

    #[wasm_bindgen(getter)]
    pub fn threshold_percent(&self) -> f64 {
        self.inner.current_filter().threshold_percent
    }

    /// Set the cutoff as a percentage of full brightness (clamped to 0..=100).
    pub fn set_threshold_percent(&mut self, percent: f64) -> Result<(), JsValue> {
        self.set_field(FilterField::ThresholdPercent(percent))
    }

    #[wasm_bindgen(getter)]
    pub fn grayscale(&self) -> bool {
        self.inner.current_filter().grayscale
    }

    pub fn set_grayscale(&mut self, on: bool) -> Result<(), JsValue> {
        self.set_field(FilterField::Grayscale(on))
    }

    #[wasm_bindgen(getter)]
    pub fn blinking(&self) -> bool {
        self.inner.current_filter().blinking
    }

    pub fn set_blinking(&mut self, on: bool) -> Result<(), JsValue> {
        self.set_field(FilterField::Blinking(on))
    }

    #[wasm_bindgen(getter)]
    pub fn blink_interval(&self) -> u32 {
        self.inner.current_filter().blink_interval_seconds
    }

    pub fn set_blink_interval(&mut self, interval: u32) -> Result<(), JsValue> {
        self.set_field(FilterField::BlinkIntervalSeconds(interval))
    }

    /// Render the active layer.
    ///
    /// Returns undefined while the source is being loaded; check
    /// `pending_load` for a fetch to start.
    pub fn render(&mut self) -> Result<Option<JsBitmap>, JsValue> {
        match self.inner.render() {
            Ok(RenderUpdate::Rendered(output)) => Ok(Some(JsBitmap::from_shared(output))),
            Ok(RenderUpdate::Pending) => Ok(None),
            Ok(RenderUpdate::Reload(request)) => {
                self.unclaimed = Some(request.generation());
                self.track(request);
                Ok(None)
            }
            Err(err) => Err(to_js(err)),
        }
    }

    /// The newest load requested by `render`, returned once.
    pub fn pending_load(&mut self) -> Option<JsLoadRequest> {
        let generation = self.unclaimed.take()?;
        self.loads
            .iter()
            .find(|request| request.generation() == generation)
            .map(JsLoadRequest::from)
    }

    /// Load the active layer's source again after a failed load.
    ///
    /// Returns the new request, or undefined when the source is already
    /// loaded or loading.
    pub fn retry_load(&mut self) -> Result<Option<JsLoadRequest>, JsValue> {
        let Some(request) = self.inner.reload_active().map_err(to_js)? else {
            return Ok(None);
        };
        let load = JsLoadRequest::from(&request);
        self.unclaimed = None;
        self.track(request);
        Ok(Some(load))
    }

    /// Decode bytes fetched for a load request.
    ///
    /// Returns the rendered layer, or undefined when a newer load has
    /// replaced this one.
    pub fn complete_load(&mut self, generation: u64, bytes: &[u8]) -> Result<Option<JsBitmap>, JsValue> {
        let Some(request) = self.take_load(generation) else {
            return Ok(None);
        };
        self.finish(request.decode_bytes(bytes))
    }

    /// Report that the host could not fetch a load request's source.
    pub fn fail_load(&mut self, generation: u64, reason: &str) -> Result<(), JsValue> {
        let Some(request) = self.take_load(generation) else {
            return Ok(());
        };
        self.finish(request.fail(DecodeError::IoError(reason.to_string())))
            .map(|_| ())
    }

    /// Whether the active layer is shown `elapsed_ms` after the blink timer
    /// started.
    pub fn is_visible(&self, elapsed_ms: f64) -> bool {
        let elapsed = Duration::from_millis(elapsed_ms.max(0.0) as u64);
        self.inner.is_visible(elapsed)
    }

    /// CSS `transform` value for the overlay element
    pub fn transform_css(&self) -> String {
        self.inner.view().transform_css()
    }

    #[wasm_bindgen(getter)]
    pub fn rotate(&self) -> f64 {
        self.inner.view().rotate
    }

    #[wasm_bindgen(setter)]
    pub fn set_rotate(&mut self, degrees: f64) {
        self.inner.view_mut().rotate = degrees;
    }

    #[wasm_bindgen(getter)]
    pub fn perspective(&self) -> f64 {
        self.inner.view().perspective
    }

    #[wasm_bindgen(setter)]
    pub fn set_perspective(&mut self, pixels: f64) {
        self.inner.view_mut().perspective = pixels;
    }

    #[wasm_bindgen(getter)]
    pub fn angle_perspective(&self) -> f64 {
        self.inner.view().angle_perspective
    }

    #[wasm_bindgen(setter)]
    pub fn set_angle_perspective(&mut self, degrees: f64) {
        self.inner.view_mut().angle_perspective = degrees;
    }

    #[wasm_bindgen(getter)]
    pub fn top(&self) -> f64 {
        self.inner.view().top
    }

    #[wasm_bindgen(setter)]
    pub fn set_top(&mut self, pixels: f64) {
        self.inner.view_mut().top = pixels;
    }

    #[wasm_bindgen(getter)]
    pub fn left(&self) -> f64 {
        self.inner.view().left
    }

    #[wasm_bindgen(setter)]
    pub fn set_left(&mut self, pixels: f64) {
        self.inner.view_mut().left = pixels;
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> f64 {
        self.inner.view().width
    }

    #[wasm_bindgen(setter)]
    pub fn set_width(&mut self, pixels: f64) {
        self.inner.view_mut().width = pixels;
    }

    #[wasm_bindgen(getter)]
    pub fn is_dark_theme(&self) -> bool {
        self.inner.view().is_dark_theme
    }

    #[wasm_bindgen(setter)]
    pub fn set_is_dark_theme(&mut self, dark: bool) {
        self.inner.view_mut().is_dark_theme = dark;
    }

    /// The session as a plain object in the saved-session shape.
    pub fn export_session(&self) -> Result<JsValue, JsValue> {
        // Plain objects rather than `Map`s, so the value can go to JSON.stringify
        self.inner
            .session()
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Replace the viewer's state with a saved session object.
    pub fn import_session(&mut self, session: JsValue) -> Result<(), JsValue> {
        let session: SessionDocument = serde_wasm_bindgen::from_value(session)
            .map_err(|e| JsValue::from_str(&format!("Invalid session: {}", e)))?;
        self.restore(&session)
    }

    /// The session as a JSON string.
    pub fn export_session_json(&self) -> Result<String, JsValue> {
        self.inner
            .session()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Replace the viewer's state with a session JSON string.
    pub fn import_session_json(&mut self, json: &str) -> Result<(), JsValue> {
        let session =
            SessionDocument::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.restore(&session)
    }
}

impl JsViewer {
    fn set_field(&mut self, field: FilterField) -> Result<(), JsValue> {
        self.inner
            .set_active_filter_field(field)
            .map(|_| ())
            .map_err(to_js)
    }

    fn take_load(&mut self, generation: u64) -> Option<DecodeRequest> {
        let index = self
            .loads
            .iter()
            .position(|request| request.generation() == generation)?;
        if self.unclaimed == Some(generation) {
            self.unclaimed = None;
        }
        Some(self.loads.remove(index))
    }

    /// Keep a newly issued request; every older one is superseded by it.
    fn track(&mut self, request: DecodeRequest) {
        let generation = request.generation();
        self.loads.retain(|load| load.generation() > generation);
        self.loads.push(request);
    }

    fn finish(&mut self, outcome: lightbox_core::DecodeOutcome) -> Result<Option<JsBitmap>, JsValue> {
        // Older loads can never apply once a newer one has finished
        let generation = outcome.generation;
        self.loads.retain(|request| request.generation() > generation);

        match self.inner.finish_decode(outcome) {
            Ok(output) => Ok(output.map(JsBitmap::from_shared)),
            Err(err) => {
                let message = err.to_string();
                console_warn(&message);
                Err(JsValue::from_str(&message))
            }
        }
    }

    fn restore(&mut self, session: &SessionDocument) -> Result<(), JsValue> {
        self.inner.restore(session).map_err(to_js)?;
        self.loads.clear();
        self.unclaimed = None;
        Ok(())
    }
}
