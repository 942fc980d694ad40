//! Luminance calculation using ITU-R BT.709 coefficients.
//!
//! The filter pipeline computes luminance in double precision over raw 8-bit
//! samples so threshold comparisons land on exactly the same side of the
//! cutoff as a browser canvas doing the same arithmetic.

/// ITU-R BT.709 coefficient for red channel in luminance calculation.
pub const LUMINANCE_R: f64 = 0.2126;

/// ITU-R BT.709 coefficient for green channel in luminance calculation.
pub const LUMINANCE_G: f64 = 0.7152;

/// ITU-R BT.709 coefficient for blue channel in luminance calculation.
pub const LUMINANCE_B: f64 = 0.0722;

/// Calculate unrounded luminance from u8 RGB values.
///
/// # Returns
/// Luminance value in 0.0..=255.0 (up to floating point error)
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    LUMINANCE_R * r as f64 + LUMINANCE_G * g as f64 + LUMINANCE_B * b as f64
}

/// Calculate luminance from u8 RGB values, rounded to a channel sample.
///
/// Rounds to nearest with ties to even, which is how a clamped 8-bit pixel
/// buffer stores a fractional value.
#[inline]
pub fn luminance_u8(r: u8, g: u8, b: u8) -> u8 {
    luminance(r, g, b).clamp(0.0, 255.0).round_ties_even() as u8
}
