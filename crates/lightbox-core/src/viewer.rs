//! The overlay viewer: layer stack, render engine and view placement together.
//!
//! Every host (the browser binding, the command line) drives the same
//! [`Viewer`]. Commands edit the layer stack; [`Viewer::render`] then feeds
//! the active layer to the engine, which decides whether to decode, re-filter
//! or reuse its last output.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use thiserror::Error;

use crate::blink;
use crate::decode::{Bitmap, DecodeError, ImageFormat};
use crate::engine::{
    DecodeOutcome, DecodeRequest, EngineError, FilterEngine, RenderInput, RenderUpdate,
};
use crate::layers::{Direction, Layer, LayerError, LayerStore};
use crate::session::{SessionDocument, SessionError, ViewState};
use crate::{FilterConfig, FilterField};

/// Errors from viewer commands.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Layer(#[from] LayerError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Default)]
pub struct Viewer {
    layers: LayerStore,
    engine: FilterEngine,
    /// Filter given to the first layer; later layers copy the active one.
    defaults: FilterConfig,
    view: ViewState,
}

impl Viewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dropped file by its declared content type.
    ///
    /// Only PNG and JPEG are accepted. The new layer starts with the active
    /// layer's filter and does not become active unless it is the first.
    pub fn add_layer(&mut self, path: &str, content_type: &str) -> Result<usize, ViewerError> {
        let format = ImageFormat::from_content_type(content_type)?;
        debug!("adding {} layer {}", format.content_type(), path);
        Ok(self.push_layer(path))
    }

    /// Add a file by its extension.
    pub fn add_layer_from_path(&mut self, path: &str) -> Result<usize, ViewerError> {
        let format = ImageFormat::from_path(path)?;
        debug!("adding {} layer {}", format.content_type(), path);
        Ok(self.push_layer(path))
    }

    fn push_layer(&mut self, path: &str) -> usize {
        let filter = self.current_filter();
        self.layers.append(Layer::new(path, filter))
    }

    /// The filter currently in effect: the active layer's, or the defaults.
    pub fn current_filter(&self) -> FilterConfig {
        self.layers
            .active_layer()
            .map(|layer| *layer.filter())
            .unwrap_or(self.defaults)
    }

    pub fn set_default_filter(&mut self, filter: FilterConfig) {
        self.defaults = filter.normalized();
    }

    /// Change one filter setting of the active layer.
    pub fn set_active_filter_field(&mut self, field: FilterField) -> Result<FilterConfig, ViewerError> {
        Ok(self.layers.update_active_filter(field)?)
    }

    /// Advance the active layer's mode: normal, threshold, inverted, normal.
    pub fn cycle_mode(&mut self) -> Result<FilterConfig, ViewerError> {
        let active = self.layers.active_layer().ok_or(LayerError::EmptyCollection)?;
        let mode = active.filter().mode.next();
        self.set_active_filter_field(FilterField::Mode(mode))
    }

    /// Switch to the next or previous layer, wrapping around.
    pub fn cycle_active_layer(&mut self, direction: Direction) -> Result<usize, ViewerError> {
        let index = self.layers.cycle(direction)?;
        debug!("active layer is now {}", index);
        Ok(index)
    }

    /// Jump straight to a layer.
    pub fn set_active_layer(&mut self, index: usize) -> Result<(), ViewerError> {
        Ok(self.layers.set_active(index)?)
    }

    /// Feed the active layer to the render engine.
    ///
    /// # Errors
    ///
    /// `LayerError::EmptyCollection` when there are no layers, or the
    /// engine's error for a source that failed to load.
    pub fn render(&mut self) -> Result<RenderUpdate, ViewerError> {
        let layer = self.layers.active_layer().ok_or(LayerError::EmptyCollection)?;
        Ok(self.engine.update(RenderInput::from(layer))?)
    }

    /// Decode the active layer's source again.
    ///
    /// Returns a request when the source had failed (or was never loaded),
    /// and `None` when it is already loading or loaded.
    pub fn reload_active(&mut self) -> Result<Option<DecodeRequest>, ViewerError> {
        let layer = self.layers.active_layer().ok_or(LayerError::EmptyCollection)?;
        let request = self.engine.set_source(layer.source_path());
        if request.is_some() {
            info!("retrying {}", layer.source_path());
        }
        Ok(request)
    }

    /// Hand a finished decode back to the engine.
    ///
    /// Returns `Ok(None)` for outcomes that no longer matter.
    pub fn finish_decode(&mut self, outcome: DecodeOutcome) -> Result<Option<Arc<Bitmap>>, ViewerError> {
        Ok(self.engine.finish_decode(outcome)?)
    }

    /// Whether the active layer is visible `elapsed` after the blink timer
    /// started. Nothing is visible without layers.
    pub fn is_visible(&self, elapsed: Duration) -> bool {
        self.layers
            .active_layer()
            .is_some_and(|layer| blink::is_visible(layer.filter(), elapsed))
    }

    /// Snapshot the viewer as a session document.
    pub fn session(&self) -> SessionDocument {
        SessionDocument::capture(&self.layers, &self.defaults, &self.view)
    }

    /// Replace the layer stack, filters and view from a saved session.
    ///
    /// Nothing changes when the document is invalid. Decodes in flight
    /// before the restore no longer apply.
    pub fn restore(&mut self, session: &SessionDocument) -> Result<(), ViewerError> {
        let (layers, working, view) = session.restore()?;
        info!("restored session with {} layers", layers.len());
        self.engine.reset();
        self.layers = layers;
        self.defaults = working;
        self.view = view;
        Ok(())
    }

    pub fn layers(&self) -> &LayerStore {
        &self.layers
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.layers.active_layer()
    }

    pub fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }
}
