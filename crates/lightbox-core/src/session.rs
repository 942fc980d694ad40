//! Saved sessions.
//!
//! A session is one JSON document holding the layer stack, the active layer,
//! the working filter settings and the view placement. Field names match the
//! files written by earlier releases, so old saves keep loading:
//!
//! ```json
//! {
//!   "isDarkTheme": false, "blinking": false, "grayscale": false,
//!   "threshold": 50, "blinkInterval": 10, "rotate": 0, "perspective": 200,
//!   "anglePerspective": -1, "top": 390, "left": 200, "activeLayer": 0,
//!   "layers": [{ "path": "...", "mode": { "type": "normal", ... } }],
//!   "modeType": "normal", "width": 500
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layers::{Layer, LayerStore};
use crate::storage::Storage;
use crate::{FilterConfig, FilterMode, DEFAULT_BLINK_INTERVAL, DEFAULT_THRESHOLD_PERCENT};

/// Errors from loading or saving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid session document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Active layer {index} out of range ({len} layers)")]
    ActiveLayerOutOfRange { index: usize, len: usize },
}

/// Placement of the overlay on screen.
///
/// Owned by the UI; the core only carries it through save and load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewState {
    pub is_dark_theme: bool,
    /// In-plane rotation in degrees
    pub rotate: f64,
    /// Perspective distance in pixels
    pub perspective: f64,
    /// Tilt around the horizontal axis in degrees
    pub angle_perspective: f64,
    /// Vertical offset in pixels
    pub top: f64,
    /// Horizontal offset in pixels
    pub left: f64,
    /// Display width in pixels
    pub width: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            is_dark_theme: false,
            rotate: 0.0,
            perspective: 200.0,
            angle_perspective: -1.0,
            top: 390.0,
            left: 200.0,
            width: 500.0,
        }
    }
}

impl ViewState {
    /// CSS transform for the overlay element.
    pub fn transform_css(&self) -> String {
        format!(
            "perspective({}px) rotate3d(1,0,0, {}deg) rotate({}deg)",
            self.perspective, self.angle_perspective, self.rotate
        )
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD_PERCENT
}

fn default_blink_interval() -> u32 {
    DEFAULT_BLINK_INTERVAL
}

/// The persisted session document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    #[serde(flatten)]
    pub view: ViewState,
    #[serde(default)]
    pub blinking: bool,
    #[serde(default)]
    pub grayscale: bool,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_blink_interval")]
    pub blink_interval: u32,
    #[serde(default)]
    pub mode_type: FilterMode,
    #[serde(default)]
    pub active_layer: usize,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl SessionDocument {
    /// Snapshot a layer stack.
    ///
    /// The working settings are the active layer's filter, or `defaults` when
    /// there are no layers.
    pub fn capture(store: &LayerStore, defaults: &FilterConfig, view: &ViewState) -> Self {
        let working = store
            .active_layer()
            .map(|layer| *layer.filter())
            .unwrap_or(*defaults);

        Self {
            view: view.clone(),
            blinking: working.blinking,
            grayscale: working.grayscale,
            threshold: working.threshold_percent,
            blink_interval: working.blink_interval_seconds,
            mode_type: working.mode,
            active_layer: store.active_index().unwrap_or(0),
            layers: store.layers().to_vec(),
        }
    }

    /// The working filter settings, brought into range.
    pub fn working_filter(&self) -> FilterConfig {
        FilterConfig {
            mode: self.mode_type,
            threshold_percent: self.threshold,
            grayscale: self.grayscale,
            blinking: self.blinking,
            blink_interval_seconds: self.blink_interval,
        }
        .normalized()
    }

    /// Rebuild the layer stack, working filter and view.
    ///
    /// The working settings were what the active layer was displayed with
    /// when the session was saved, so they become the active layer's filter.
    pub fn restore(&self) -> Result<(LayerStore, FilterConfig, ViewState), SessionError> {
        let working = self.working_filter();
        let mut store = LayerStore::new();
        for (index, layer) in self.layers.iter().enumerate() {
            let filter = if index == self.active_layer {
                working
            } else {
                layer.filter().normalized()
            };
            store.append(Layer::new(layer.source_path(), filter));
        }

        if !store.is_empty() {
            store
                .set_active(self.active_layer)
                .map_err(|_| SessionError::ActiveLayerOutOfRange {
                    index: self.active_layer,
                    len: self.layers.len(),
                })?;
        }

        Ok((store, working, self.view.clone()))
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the document as JSON to `path`.
    pub fn save<S: Storage + ?Sized>(&self, storage: &S, path: &str) -> Result<(), SessionError> {
        storage.write(path, self.to_json()?.as_bytes())?;
        Ok(())
    }

    /// Read a JSON document from `path`.
    pub fn load<S: Storage + ?Sized>(storage: &S, path: &str) -> Result<Self, SessionError> {
        let bytes = storage.read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
