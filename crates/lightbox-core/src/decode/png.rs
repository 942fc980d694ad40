//! PNG decoding.

use std::io::Cursor;

use image::ImageReader;

use super::{Bitmap, DecodeError};

/// Decode PNG bytes into an RGBA bitmap.
///
/// Palette, gray and 16-bit PNGs are converted to 8-bit RGBA.
pub fn decode_png(bytes: &[u8]) -> Result<Bitmap, DecodeError> {
    let img = ImageReader::with_format(Cursor::new(bytes), image::ImageFormat::Png)
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    Ok(Bitmap::from_rgba_image(img.into_rgba8()))
}
