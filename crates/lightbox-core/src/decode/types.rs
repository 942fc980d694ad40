//! Core types for image decoding.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The content is not one of the accepted encodings (PNG, JPEG).
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// I/O error while reading the source.
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Source encodings a layer may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Resolve a declared MIME content type, as supplied by a file drop.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::UnsupportedFormat` for anything other than
    /// `image/png` and `image/jpeg`.
    pub fn from_content_type(content_type: &str) -> Result<Self, DecodeError> {
        match content_type.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(ImageFormat::Png),
            "image/jpeg" => Ok(ImageFormat::Jpeg),
            other => Err(DecodeError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Resolve a format from a file extension (png, jpg, jpeg).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("png") => Ok(ImageFormat::Png),
            Some("jpg") | Some("jpeg") => Ok(ImageFormat::Jpeg),
            _ => Err(DecodeError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Detect the format from the leading byte signature.
    pub fn sniff(bytes: &[u8]) -> Result<Self, DecodeError> {
        match image::guess_format(bytes) {
            Ok(image::ImageFormat::Png) => Ok(ImageFormat::Png),
            Ok(image::ImageFormat::Jpeg) => Ok(ImageFormat::Jpeg),
            Ok(other) => Err(DecodeError::UnsupportedFormat(format!("{:?}", other))),
            Err(_) => Err(DecodeError::UnsupportedFormat(
                "unrecognized byte signature".to_string(),
            )),
        }
    }

    /// The MIME content type of this format.
    pub fn content_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// An RGBA bitmap, used both for decoded sources and rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Create a new Bitmap with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a Bitmap from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.into_raw();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
