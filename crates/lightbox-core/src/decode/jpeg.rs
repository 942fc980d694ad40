//! JPEG decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{Bitmap, DecodeError};

/// How a camera stored the frame, from the EXIF orientation tag.
///
/// Variants follow tag values 1 to 8. Unknown values read as `Upright`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExifOrientation {
    #[default]
    Upright,
    Mirrored,
    UpsideDown,
    MirroredUpsideDown,
    MirroredRotatedLeft,
    RotatedRight,
    MirroredRotatedRight,
    RotatedLeft,
}

impl ExifOrientation {
    pub fn from_tag(value: u32) -> Self {
        match value {
            2 => ExifOrientation::Mirrored,
            3 => ExifOrientation::UpsideDown,
            4 => ExifOrientation::MirroredUpsideDown,
            5 => ExifOrientation::MirroredRotatedLeft,
            6 => ExifOrientation::RotatedRight,
            7 => ExifOrientation::MirroredRotatedRight,
            8 => ExifOrientation::RotatedLeft,
            _ => ExifOrientation::Upright,
        }
    }

    /// Turn a decoded frame upright.
    fn correct(self, img: DynamicImage) -> DynamicImage {
        match self {
            ExifOrientation::Upright => img,
            ExifOrientation::Mirrored => img.fliph(),
            ExifOrientation::UpsideDown => img.rotate180(),
            ExifOrientation::MirroredUpsideDown => img.flipv(),
            ExifOrientation::MirroredRotatedLeft => img.rotate90().fliph(),
            ExifOrientation::RotatedRight => img.rotate90(),
            ExifOrientation::MirroredRotatedRight => img.rotate270().fliph(),
            ExifOrientation::RotatedLeft => img.rotate270(),
        }
    }
}

/// Decode JPEG bytes into an upright RGBA bitmap.
///
/// # Errors
///
/// Returns `DecodeError::CorruptedFile` if the JPEG is truncated or invalid.
pub fn decode_jpeg(bytes: &[u8]) -> Result<Bitmap, DecodeError> {
    let orientation = read_orientation(bytes);

    let frame = ImageReader::with_format(Cursor::new(bytes), image::ImageFormat::Jpeg)
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    Ok(Bitmap::from_rgba_image(orientation.correct(frame).into_rgba8()))
}

/// Read the orientation tag, if the bytes carry EXIF data at all.
pub fn read_orientation(bytes: &[u8]) -> ExifOrientation {
    let Ok(exif) = Reader::new().read_from_container(&mut Cursor::new(bytes)) else {
        return ExifOrientation::Upright;
    };
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(ExifOrientation::from_tag)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal valid JPEG bytes (1x1 pixel, single component, no EXIF)
    const MINIMAL_JPEG: &[u8] = &[
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00,
        0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xDB, 0x00, 0x43, 0x00, 0x08, 0x06, 0x06, 0x07, 0x06,
        0x05, 0x08, 0x07, 0x07, 0x07, 0x09, 0x09, 0x08, 0x0A, 0x0C, 0x14, 0x0D, 0x0C, 0x0B, 0x0B,
        0x0C, 0x19, 0x12, 0x13, 0x0F, 0x14, 0x1D, 0x1A, 0x1F, 0x1E, 0x1D, 0x1A, 0x1C, 0x1C, 0x20,
        0x24, 0x2E, 0x27, 0x20, 0x22, 0x2C, 0x23, 0x1C, 0x1C, 0x28, 0x37, 0x29, 0x2C, 0x30, 0x31,
        0x34, 0x34, 0x34, 0x1F, 0x27, 0x39, 0x3D, 0x38, 0x32, 0x3C, 0x2E, 0x33, 0x34, 0x32, 0xFF,
        0xC0, 0x00, 0x0B, 0x08, 0x00, 0x01, 0x00, 0x01, 0x01, 0x01, 0x11, 0x00, 0xFF, 0xC4, 0x00,
        0x1F, 0x00, 0x00, 0x01, 0x05, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B,
        0xFF, 0xC4, 0x00, 0xB5, 0x10, 0x00, 0x02, 0x01, 0x03, 0x03, 0x02, 0x04, 0x03, 0x05, 0x05,
        0x04, 0x04, 0x00, 0x00, 0x01, 0x7D, 0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21,
        0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07, 0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xA1, 0x08,
        0x23, 0x42, 0xB1, 0xC1, 0x15, 0x52, 0xD1, 0xF0, 0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0A,
        0x16, 0x17, 0x18, 0x19, 0x1A, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2A, 0x34, 0x35, 0x36, 0x37,
        0x38, 0x39, 0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4A, 0x53, 0x54, 0x55, 0x56,
        0x57, 0x58, 0x59, 0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6A, 0x73, 0x74, 0x75,
        0x76, 0x77, 0x78, 0x79, 0x7A, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8A, 0x92, 0x93,
        0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9,
        0xAA, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6,
        0xC7, 0xC8, 0xC9, 0xCA, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xE1, 0xE2,
        0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA, 0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7,
        0xF8, 0xF9, 0xFA, 0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00, 0xFB, 0xD5,
        0xDB, 0x20, 0xA8, 0xF1, 0x7E, 0xFF, 0xD9,
    ];

    fn strip(pixels: Vec<u8>, width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(image::RgbaImage::from_raw(width, height, pixels).unwrap())
    }

    #[test]
    fn test_decode_valid_jpeg() {
        let img = decode_jpeg(MINIMAL_JPEG).expect("minimal JPEG should decode");
        assert_eq!((img.width, img.height), (1, 1));
        assert_eq!(img.pixels.len(), 4); // 1x1 RGBA = 4 bytes
        assert_eq!(img.pixels[3], 255, "JPEG has no alpha, so it is opaque");
        // Single component source decodes to gray
        assert_eq!(img.pixels[0], img.pixels[1]);
        assert_eq!(img.pixels[1], img.pixels[2]);
    }

    #[test]
    fn test_decode_invalid_jpeg() {
        match decode_jpeg(&[0x00, 0x01, 0x02, 0x03]) {
            Err(DecodeError::CorruptedFile(_)) => {}
            other => panic!("Expected CorruptedFile error, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_truncated_jpeg() {
        assert!(decode_jpeg(&MINIMAL_JPEG[0..20]).is_err());
    }

    #[test]
    fn test_missing_exif_is_upright() {
        assert_eq!(read_orientation(MINIMAL_JPEG), ExifOrientation::Upright);
        assert_eq!(read_orientation(&[0x00, 0x01, 0x02]), ExifOrientation::Upright);
    }

    #[test]
    fn test_orientation_tags() {
        assert_eq!(ExifOrientation::from_tag(1), ExifOrientation::Upright);
        assert_eq!(ExifOrientation::from_tag(6), ExifOrientation::RotatedRight);
        assert_eq!(ExifOrientation::from_tag(0), ExifOrientation::Upright);
        assert_eq!(ExifOrientation::from_tag(42), ExifOrientation::Upright);
    }

    #[test]
    fn test_rotated_frame_is_turned_upright() {
        let img = strip(vec![255, 0, 0, 255, 0, 255, 0, 255], 2, 1);
        let result = ExifOrientation::RotatedRight.correct(img).into_rgba8();
        assert_eq!(result.dimensions(), (1, 2));
    }

    #[test]
    fn test_mirrored_frame_keeps_alpha() {
        let img = strip(vec![255, 0, 0, 10, 0, 255, 0, 20], 2, 1);
        let result = ExifOrientation::Mirrored.correct(img).into_rgba8();
        assert_eq!(result.get_pixel(0, 0).0, [0, 255, 0, 20]);
        assert_eq!(result.get_pixel(1, 0).0, [255, 0, 0, 10]);
    }
}
