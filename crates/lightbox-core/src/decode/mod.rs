//! Image decoding for Lightbox layers.
//!
//! This module provides functionality for:
//! - Recognizing the accepted source formats (PNG, JPEG)
//! - Decoding source bytes into an RGBA [`Bitmap`]
//! - Applying EXIF orientation to JPEG photos
//!
//! Formats are checked before any decoding work starts: a declared content
//! type is checked when a layer is added, and the byte signature is checked
//! again when the bytes arrive.

mod jpeg;
mod png;
mod types;

pub use jpeg::{decode_jpeg, read_orientation, ExifOrientation};
pub use png::decode_png;
pub use types::{Bitmap, DecodeError, ImageFormat};

/// Decode PNG or JPEG bytes into an RGBA bitmap.
///
/// # Errors
///
/// Returns `DecodeError::UnsupportedFormat` if the byte signature is neither
/// PNG nor JPEG. Returns `DecodeError::CorruptedFile` if decoding fails.
pub fn decode_image(bytes: &[u8]) -> Result<Bitmap, DecodeError> {
    match ImageFormat::sniff(bytes)? {
        ImageFormat::Png => decode_png(bytes),
        ImageFormat::Jpeg => decode_jpeg(bytes),
    }
}
