//! Lightbox Core - layer store and filter engine
//!
//! This crate provides the core of the Lightbox image overlay: an ordered
//! stack of image layers, a per-pixel filter pipeline (grayscale, threshold,
//! inverted threshold), and a render engine that decodes each source once and
//! only recomputes pixels when the filter actually changes.

pub mod blink;
pub mod decode;
pub mod encode;
pub mod engine;
pub mod filter;
pub mod layers;
pub mod luminance;
pub mod session;
pub mod storage;
pub mod viewer;

pub use blink::BlinkSchedule;
pub use decode::{decode_image, Bitmap, DecodeError, ImageFormat};
pub use engine::{
    classify, BackgroundDecoder, Change, DecodeOutcome, DecodeRequest, EngineError,
    FilterEngine, RenderInput, RenderState, RenderUpdate,
};
pub use layers::{Direction, Layer, LayerError, LayerStore};
pub use session::{SessionDocument, SessionError, ViewState};
pub use storage::{FsStorage, MemoryStorage, Storage};
pub use viewer::{Viewer, ViewerError};

use serde::{Deserialize, Serialize};

/// Default threshold percentage for new layers.
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 50.0;

/// Default blink interval for new layers.
pub const DEFAULT_BLINK_INTERVAL: u32 = 10;

/// How a layer's pixels are binarized, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Pixels are shown as decoded (optionally grayscaled).
    #[default]
    Normal,
    /// Pixels at or above the cutoff become white, the rest black.
    Threshold,
    /// Pixels at or above the cutoff become black, the rest white.
    ThresholdInverted,
}

impl FilterMode {
    /// The mode that follows this one in the Normal -> Threshold -> Inverted cycle.
    pub fn next(self) -> Self {
        match self {
            FilterMode::Normal => FilterMode::Threshold,
            FilterMode::Threshold => FilterMode::ThresholdInverted,
            FilterMode::ThresholdInverted => FilterMode::Normal,
        }
    }

    /// Parse the persisted name of a mode.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "normal" => Some(FilterMode::Normal),
            "threshold" => Some(FilterMode::Threshold),
            "threshold_inverted" => Some(FilterMode::ThresholdInverted),
            _ => None,
        }
    }

    /// The persisted name of this mode.
    pub fn name(self) -> &'static str {
        match self {
            FilterMode::Normal => "normal",
            FilterMode::Threshold => "threshold",
            FilterMode::ThresholdInverted => "threshold_inverted",
        }
    }
}

/// Filter configuration of a single layer.
///
/// A plain value: replacing a layer's filter never affects a copy held
/// elsewhere. Serializes to the persisted layer mode shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Binarization mode
    #[serde(rename = "type")]
    pub mode: FilterMode,
    /// Threshold cutoff as a percentage of full brightness (0 to 100)
    #[serde(rename = "thresholdValue")]
    pub threshold_percent: f64,
    /// Convert to BT.709 luminance before thresholding
    pub grayscale: bool,
    /// Periodically hide the layer
    pub blinking: bool,
    /// Blink period, at least 1 (see [`BlinkSchedule`] for the tick length)
    #[serde(rename = "blinkInterval")]
    pub blink_interval_seconds: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            mode: FilterMode::Normal,
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            grayscale: false,
            blinking: false,
            blink_interval_seconds: DEFAULT_BLINK_INTERVAL,
        }
    }
}

/// A single field update for a [`FilterConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterField {
    Mode(FilterMode),
    ThresholdPercent(f64),
    Grayscale(bool),
    Blinking(bool),
    BlinkIntervalSeconds(u32),
}

impl FilterConfig {
    /// Create a new FilterConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with one field replaced.
    ///
    /// Thresholds are clamped to 0..=100 and non-finite thresholds are
    /// ignored. Blink intervals below 1 become 1.
    pub fn with_field(&self, field: FilterField) -> Self {
        let mut next = *self;
        match field {
            FilterField::Mode(mode) => next.mode = mode,
            FilterField::ThresholdPercent(percent) => {
                if percent.is_finite() {
                    next.threshold_percent = percent.clamp(0.0, 100.0);
                }
            }
            FilterField::Grayscale(on) => next.grayscale = on,
            FilterField::Blinking(on) => next.blinking = on,
            FilterField::BlinkIntervalSeconds(interval) => {
                next.blink_interval_seconds = interval.max(1)
            }
        }
        next
    }

    /// Bring externally supplied values back into range.
    pub fn normalized(&self) -> Self {
        let threshold_percent = if self.threshold_percent.is_finite() {
            self.threshold_percent.clamp(0.0, 100.0)
        } else {
            DEFAULT_THRESHOLD_PERCENT
        };
        Self {
            threshold_percent,
            blink_interval_seconds: self.blink_interval_seconds.max(1),
            ..*self
        }
    }

    /// Check whether rendering with this config leaves pixels unchanged.
    pub fn is_identity(&self) -> bool {
        self.mode == FilterMode::Normal && !self.grayscale
    }
}
