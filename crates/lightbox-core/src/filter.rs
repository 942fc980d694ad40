//! Per-pixel filter pipeline
//!
//! Applies a [`FilterConfig`] to RGBA pixel data.
//!
//! ## Filter Order
//! 1. Grayscale (if enabled)
//! 2. Threshold or inverted threshold (depending on the mode)
//!
//! Alpha samples are never written. Rendering always starts from a copy of the
//! decoded source, so repeated renders with different configs never compound.

use crate::decode::Bitmap;
use crate::luminance::{luminance, luminance_u8};
use crate::{FilterConfig, FilterMode};

/// Number of channel samples per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Convert a threshold percentage (0 to 100) into a luminance cutoff (0 to 255).
#[inline]
pub fn threshold_cutoff(percent: f64) -> f64 {
    255.0 * percent / 100.0
}

/// Apply the whole filter pipeline to RGBA pixel data in place.
///
/// # Arguments
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `filter` - The filter configuration to apply
pub fn apply_filter(pixels: &mut [u8], filter: &FilterConfig) {
    if filter.grayscale {
        apply_grayscale(pixels);
    }

    match filter.mode {
        FilterMode::Normal => {}
        FilterMode::Threshold => {
            apply_threshold(pixels, threshold_cutoff(filter.threshold_percent), false)
        }
        FilterMode::ThresholdInverted => {
            apply_threshold(pixels, threshold_cutoff(filter.threshold_percent), true)
        }
    }
}

/// Replace R, G and B of every pixel with its BT.709 luminance.
pub fn apply_grayscale(pixels: &mut [u8]) {
    for chunk in pixels.chunks_exact_mut(CHANNELS) {
        let lum = luminance_u8(chunk[0], chunk[1], chunk[2]);
        chunk[0] = lum;
        chunk[1] = lum;
        chunk[2] = lum;
    }
}

/// Binarize every pixel against a luminance cutoff.
///
/// Pixels with luminance `>= cutoff` become white, the rest black. With
/// `inverted` set the two outputs swap.
pub fn apply_threshold(pixels: &mut [u8], cutoff: f64, inverted: bool) {
    let (above, below) = if inverted { (0, 255) } else { (255, 0) };

    for chunk in pixels.chunks_exact_mut(CHANNELS) {
        let value = if luminance(chunk[0], chunk[1], chunk[2]) >= cutoff {
            above
        } else {
            below
        };
        chunk[0] = value;
        chunk[1] = value;
        chunk[2] = value;
    }
}

/// Render a filtered copy of `source`.
///
/// The source is left untouched; the returned bitmap owns a fresh buffer.
pub fn render(source: &Bitmap, filter: &FilterConfig) -> Bitmap {
    let mut pixels = source.pixels.clone();
    apply_filter(&mut pixels, filter);
    Bitmap {
        width: source.width,
        height: source.height,
        pixels,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for RGBA buffers of whole pixels.
    fn pixels_strategy() -> impl Strategy<Value = Vec<u8>> {
        (1usize..=64).prop_flat_map(|n| proptest::collection::vec(any::<u8>(), n * CHANNELS))
    }

    fn mode_strategy() -> impl Strategy<Value = FilterMode> {
        prop_oneof![
            Just(FilterMode::Normal),
            Just(FilterMode::Threshold),
            Just(FilterMode::ThresholdInverted),
        ]
    }

    proptest! {
        /// Property: Normal mode without grayscale is the identity.
        #[test]
        fn prop_normal_is_identity(pixels in pixels_strategy(), percent in 0.0f64..=100.0) {
            let mut out = pixels.clone();
            let filter = FilterConfig { threshold_percent: percent, ..FilterConfig::default() };
            apply_filter(&mut out, &filter);
            prop_assert_eq!(out, pixels);
        }

        /// Property: Grayscale applied twice equals grayscale applied once.
        #[test]
        fn prop_grayscale_idempotent(pixels in pixels_strategy()) {
            let mut once = pixels.clone();
            apply_grayscale(&mut once);
            let mut twice = once.clone();
            apply_grayscale(&mut twice);
            prop_assert_eq!(twice, once);
        }

        /// Property: Threshold and inverted threshold are complementary on RGB.
        #[test]
        fn prop_threshold_modes_complementary(
            pixels in pixels_strategy(),
            percent in 0.0f64..=100.0,
            grayscale in any::<bool>(),
        ) {
            let base = FilterConfig { threshold_percent: percent, grayscale, ..FilterConfig::default() };
            let mut plain = pixels.clone();
            apply_filter(&mut plain, &FilterConfig { mode: FilterMode::Threshold, ..base });
            let mut inverted = pixels.clone();
            apply_filter(&mut inverted, &FilterConfig { mode: FilterMode::ThresholdInverted, ..base });

            for (a, b) in plain.chunks_exact(CHANNELS).zip(inverted.chunks_exact(CHANNELS)) {
                for c in 0..3 {
                    prop_assert_eq!(a[c], 255 - b[c]);
                }
                prop_assert_eq!(a[3], b[3]);
            }
        }

        /// Property: No mode ever touches alpha.
        #[test]
        fn prop_alpha_untouched(
            pixels in pixels_strategy(),
            mode in mode_strategy(),
            percent in 0.0f64..=100.0,
            grayscale in any::<bool>(),
        ) {
            let mut out = pixels.clone();
            apply_filter(&mut out, &FilterConfig { mode, threshold_percent: percent, grayscale, ..FilterConfig::default() });
            for (a, b) in out.chunks_exact(CHANNELS).zip(pixels.chunks_exact(CHANNELS)) {
                prop_assert_eq!(a[3], b[3]);
            }
        }

        /// Property: Rendering is non-cumulative: same config, same output.
        #[test]
        fn prop_render_non_cumulative(
            pixels in pixels_strategy(),
            mode in mode_strategy(),
            percent in 0.0f64..=100.0,
            grayscale in any::<bool>(),
        ) {
            let source = Bitmap::new((pixels.len() / CHANNELS) as u32, 1, pixels);
            let filter = FilterConfig { mode, threshold_percent: percent, grayscale, ..FilterConfig::default() };
            let first = render(&source, &filter);
            let other = render(&source, &FilterConfig { grayscale: !grayscale, ..filter });
            let again = render(&source, &filter);
            prop_assert_eq!(&first, &again);
            prop_assert_eq!(other.pixels.len(), first.pixels.len());
        }
    }
}
