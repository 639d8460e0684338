//! Global thresholding.
//!
//! Foreground follows the dark-on-light convention: a pixel is foreground iff
//! its intensity is strictly below the threshold.

use image::GrayImage;
use crate::{error::Result, traits::Binarizer, types::BinaryMask};

/// 256-bin intensity histogram
pub fn histogram(image: &GrayImage) -> [u64; 256] {
    let mut bins = [0u64; 256];
    for &value in image.as_raw() {
        bins[value as usize] += 1;
    }
    bins
}

/// Otsu's threshold: the `t` maximizing `wB * wF * (mB - mF)^2`, where the
/// background class holds intensities `<= t`.
///
/// Ties keep the lowest `t`. When no split has positive variance (a single
/// intensity, or an empty histogram) the result is 0.
pub fn otsu_threshold(histogram: &[u64; 256]) -> u8 {
    let total: u64 = histogram.iter().sum();
    let sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(t, &count)| t as f64 * count as f64)
        .sum();

    let mut weight_b = 0u64;
    let mut sum_b = 0.0;
    let mut max_variance = 0.0;
    let mut threshold = 0u8;

    for (t, &count) in histogram.iter().enumerate() {
        weight_b += count;
        if weight_b == 0 {
            continue;
        }
        let weight_f = total - weight_b;
        if weight_f == 0 {
            break;
        }

        sum_b += t as f64 * count as f64;
        let mean_b = sum_b / weight_b as f64;
        let mean_f = (sum - sum_b) / weight_f as f64;
        let variance = weight_b as f64 * weight_f as f64 * (mean_b - mean_f).powi(2);

        if variance > max_variance {
            max_variance = variance;
            threshold = t as u8;
        }
    }

    threshold
}

/// Mask pixels strictly darker than `threshold`
pub fn apply_threshold(image: &GrayImage, threshold: u8) -> BinaryMask {
    BinaryMask::from_fn(image.width(), image.height(), threshold, |x, y| {
        image.get_pixel(x, y).0[0] < threshold
    })
}

/// Automatic global threshold via Otsu's method.
///
/// A perfectly two-tone image ties every split and lands on `t = 0`, which
/// leaves no foreground; crisp input needs a blur preprocessor or a
/// [`FixedThresholdBinarizer`].
#[derive(Debug, Clone, Default)]
pub struct OtsuBinarizer;

impl Binarizer for OtsuBinarizer {
    fn binarize(&self, image: &GrayImage) -> Result<BinaryMask> {
        let threshold = otsu_threshold(&histogram(image));
        Ok(apply_threshold(image, threshold))
    }
}

/// Simple fixed thresholding binarizer
#[derive(Debug, Clone)]
pub struct FixedThresholdBinarizer {
    pub threshold: u8,
}

impl Default for FixedThresholdBinarizer {
    fn default() -> Self {
        Self { threshold: 128 }
    }
}

impl Binarizer for FixedThresholdBinarizer {
    fn binarize(&self, image: &GrayImage) -> Result<BinaryMask> {
        Ok(apply_threshold(image, self.threshold))
    }
}
