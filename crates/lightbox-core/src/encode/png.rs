//! PNG encoding for export.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::decode::Bitmap;

/// Errors that can occur during PNG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode an RGBA bitmap to PNG bytes.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` for an empty bitmap and
/// `EncodeError::InvalidPixelData` if the buffer length is wrong.
pub fn encode_png(bitmap: &Bitmap) -> Result<Vec<u8>, EncodeError> {
    let (width, height, pixels) = (bitmap.width, bitmap.height, &bitmap.pixels);

    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 4;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_encode_png_basic() {
        let bitmap = Bitmap::new(10, 10, vec![128u8; 10 * 10 * 4]);
        let bytes = encode_png(&bitmap).unwrap();
        assert_eq!(bytes[0..8], PNG_SIGNATURE);
    }

    #[test]
    fn test_encode_png_invalid_pixel_data() {
        let bitmap = Bitmap {
            width: 10,
            height: 10,
            pixels: vec![0u8; 10 * 9 * 4], // One row short
        };
        assert!(matches!(
            encode_png(&bitmap),
            Err(EncodeError::InvalidPixelData {
                expected: 400,
                actual: 360
            })
        ));
    }

    #[test]
    fn test_encode_png_zero_dimensions() {
        let bitmap = Bitmap {
            width: 0,
            height: 5,
            pixels: vec![],
        };
        assert!(matches!(
            encode_png(&bitmap),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_encode_png_preserves_pixels() {
        let bitmap = Bitmap::new(2, 2, (0..16).map(|v| v * 16).collect());
        let bytes = encode_png(&bitmap).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().into_rgba8();
        assert_eq!(decoded.into_raw(), bitmap.pixels);
    }
}
