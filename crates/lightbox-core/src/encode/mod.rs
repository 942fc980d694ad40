//! Image encoding for exporting rendered layers.
//!
//! Rendered bitmaps are exported as PNG: thresholded output is two-tone and
//! compresses well losslessly, and the alpha channel survives.

mod png;

pub use png::{encode_png, EncodeError};
