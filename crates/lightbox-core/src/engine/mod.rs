//! Render engine for the active layer.
//!
//! The engine turns a layer's source path and filter into a displayable
//! bitmap while doing as little work as possible:
//!
//! - A new source path starts a decode (a [`DecodeRequest`] the caller runs,
//!   possibly on another thread) and throws away the old decoded image.
//! - A new filter on the same source re-filters the cached decode.
//! - An identical input returns the previous output without touching pixels.
//!
//! # States
//!
//! ```text
//! Unloaded --set_source--> Loading --ok--> Ready --set_source(new path)--> Loading
//!                                  \--err--> Failed --set_source--> Loading
//! ```
//!
//! Every decode carries a generation number. Only the outcome matching the
//! current generation is applied; anything older is dropped.

mod change;
mod loader;
mod request;

pub use change::{classify, Change, RenderInput};
pub use loader::BackgroundDecoder;
pub use request::{DecodeOutcome, DecodeRequest};

use std::sync::Arc;

use log::{debug, trace, warn};
use thiserror::Error;

use crate::decode::Bitmap;
use crate::filter;
use crate::FilterConfig;

/// Errors surfaced by the render engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// No decoded source is available yet.
    #[error("No image is loaded yet")]
    NotReady,

    /// The source could not be read or decoded.
    #[error("Failed to load {path}: {reason}")]
    DecodeFailure { path: String, reason: String },
}

/// Where the engine is in the load/render cycle.
#[derive(Debug, Clone)]
pub enum RenderState {
    Unloaded,
    Loading { path: String, generation: u64 },
    Ready { path: String, source: Arc<Bitmap> },
    Failed { path: String, reason: String },
}

impl RenderState {
    /// The source path this state refers to.
    pub fn path(&self) -> Option<&str> {
        match self {
            RenderState::Unloaded => None,
            RenderState::Loading { path, .. }
            | RenderState::Ready { path, .. }
            | RenderState::Failed { path, .. } => Some(path),
        }
    }
}

/// Result of feeding a render input to [`FilterEngine::update`].
#[derive(Debug)]
pub enum RenderUpdate {
    /// The source changed. Run the request and pass the outcome to
    /// [`FilterEngine::finish_decode`].
    Reload(DecodeRequest),
    /// A decode for this source is still in flight.
    Pending,
    /// The output for the input, possibly the cached one.
    Rendered(Arc<Bitmap>),
}

/// Decode-once, re-filter-on-change renderer.
#[derive(Debug)]
pub struct FilterEngine {
    state: RenderState,
    generation: u64,
    /// Most recently requested filter; applied when a pending decode lands.
    filter: FilterConfig,
    /// Last output and the filter it was rendered with.
    output: Option<(FilterConfig, Arc<Bitmap>)>,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterEngine {
    pub fn new() -> Self {
        Self {
            state: RenderState::Unloaded,
            generation: 0,
            filter: FilterConfig::default(),
            output: None,
        }
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Generation of the most recent decode request.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The decoded source, when ready.
    pub fn source(&self) -> Option<&Arc<Bitmap>> {
        match &self.state {
            RenderState::Ready { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The last rendered output.
    pub fn output(&self) -> Option<Arc<Bitmap>> {
        self.output.as_ref().map(|(_, output)| Arc::clone(output))
    }

    /// Point the engine at a source.
    ///
    /// Returns a request to run when a decode is needed, or `None` when the
    /// path is already loaded or loading. A failed source can be retried by
    /// setting the same path again.
    pub fn set_source(&mut self, path: &str) -> Option<DecodeRequest> {
        let unchanged = match &self.state {
            RenderState::Loading { path: current, .. } | RenderState::Ready { path: current, .. } => {
                current == path
            }
            RenderState::Unloaded | RenderState::Failed { .. } => false,
        };

        if unchanged {
            trace!("source {} already current", path);
            return None;
        }
        Some(self.begin_load(path))
    }

    /// Forget the current source and output.
    ///
    /// The generation counter keeps counting, so outcomes of decodes issued
    /// before the reset stay stale.
    pub fn reset(&mut self) {
        debug!("resetting engine at generation {}", self.generation);
        self.state = RenderState::Unloaded;
        self.output = None;
    }

    fn begin_load(&mut self, path: &str) -> DecodeRequest {
        self.generation += 1;
        self.output = None;
        self.state = RenderState::Loading {
            path: path.to_string(),
            generation: self.generation,
        };
        debug!("loading {} (generation {})", path, self.generation);
        DecodeRequest::new(self.generation, path)
    }

    /// Apply the outcome of a decode request.
    ///
    /// Stale outcomes (an older generation, or arriving when no load is
    /// pending) are dropped and yield `Ok(None)`. A successful decode is
    /// rendered with the most recently requested filter.
    pub fn finish_decode(
        &mut self,
        outcome: DecodeOutcome,
    ) -> Result<Option<Arc<Bitmap>>, EngineError> {
        let is_current = matches!(
            self.state,
            RenderState::Loading { generation, .. } if generation == outcome.generation
        );
        if !is_current {
            debug!(
                "discarding stale decode of {} (generation {}, current {})",
                outcome.path, outcome.generation, self.generation
            );
            return Ok(None);
        }

        let DecodeOutcome { path, result, .. } = outcome;
        match result {
            Ok(bitmap) => {
                debug!("decoded {} ({}x{})", path, bitmap.width, bitmap.height);
                self.state = RenderState::Ready {
                    path,
                    source: Arc::new(bitmap),
                };
                let filter = self.filter;
                self.apply_filter(&filter).map(Some)
            }
            Err(err) => {
                let reason = err.to_string();
                warn!("failed to load {}: {}", path, reason);
                self.state = RenderState::Failed {
                    path: path.clone(),
                    reason: reason.clone(),
                };
                Err(EngineError::DecodeFailure { path, reason })
            }
        }
    }

    /// Render the decoded source with `filter`.
    ///
    /// Returns the cached output when it was rendered with an identical
    /// filter. A failed source re-raises its failure.
    pub fn apply_filter(&mut self, filter: &FilterConfig) -> Result<Arc<Bitmap>, EngineError> {
        self.filter = *filter;

        let source = match &self.state {
            RenderState::Ready { source, .. } => Arc::clone(source),
            RenderState::Failed { path, reason } => {
                return Err(EngineError::DecodeFailure {
                    path: path.clone(),
                    reason: reason.clone(),
                })
            }
            RenderState::Unloaded | RenderState::Loading { .. } => {
                return Err(EngineError::NotReady)
            }
        };

        if let Some((rendered_with, output)) = &self.output {
            if rendered_with == filter {
                trace!("filter unchanged, reusing output");
                return Ok(Arc::clone(output));
            }
        }

        let output = Arc::new(filter::render(&source, filter));
        trace!(
            "rendered {}x{} with {:?}",
            output.width,
            output.height,
            filter
        );
        self.output = Some((*filter, Arc::clone(&output)));
        Ok(output)
    }

    /// Feed the active layer's current input to the engine.
    ///
    /// A changed source path starts a reload; otherwise the cached decode is
    /// re-filtered (or the previous output reused when nothing changed).
    pub fn update(&mut self, next: RenderInput<'_>) -> Result<RenderUpdate, EngineError> {
        let previous = self.state.path().map(|path| RenderInput::new(path, self.filter));

        match classify(previous, next) {
            Change::Reload => {
                self.filter = next.filter;
                Ok(RenderUpdate::Reload(self.begin_load(next.source_path)))
            }
            Change::FilterOnly | Change::Unchanged => {
                if matches!(self.state, RenderState::Loading { .. }) {
                    self.filter = next.filter;
                    return Ok(RenderUpdate::Pending);
                }
                self.apply_filter(&next.filter).map(RenderUpdate::Rendered)
            }
        }
    }
}
