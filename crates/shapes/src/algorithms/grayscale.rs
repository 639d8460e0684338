use image::{GrayImage, Luma, RgbaImage};
use crate::error::{DetectionError, Result};

/// ITU-R BT.601 luma weights
const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

/// Luma of one RGB triple, rounded and clamped to `[0, 255]`.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let gray = LUMA_R * r as f64 + LUMA_G * g as f64 + LUMA_B * b as f64;
    gray.round().clamp(0.0, 255.0) as u8
}

/// Reduce a row-major interleaved RGBA buffer to one intensity byte per pixel.
///
/// Alpha is ignored. Fails only when the buffer length does not match
/// `width * height * 4`.
pub fn to_intensity(pixels: &[u8], width: u32, height: u32) -> Result<GrayImage> {
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        return Err(DetectionError::BufferSizeMismatch {
            width,
            height,
            expected,
            actual: pixels.len(),
        });
    }

    let data = pixels
        .chunks_exact(4)
        .map(|px| luma(px[0], px[1], px[2]))
        .collect();

    GrayImage::from_raw(width, height, data).ok_or_else(|| {
        DetectionError::ImageProcessing("intensity buffer does not match image dimensions".to_string())
    })
}

/// Same reduction for an already-decoded RGBA image
pub fn rgba_to_intensity(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, _] = image.get_pixel(x, y).0;
        Luma([luma(r, g, b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_luma_weights() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
        for v in [1u8, 17, 128, 200, 254] {
            assert_eq!(luma(v, v, v), v, "gray input must map to itself");
        }
    }

    #[test]
    fn test_alpha_is_ignored() {
        let opaque = to_intensity(&[10, 200, 30, 255], 1, 1).unwrap();
        let clear = to_intensity(&[10, 200, 30, 0], 1, 1).unwrap();
        assert_eq!(opaque.get_pixel(0, 0), clear.get_pixel(0, 0));
    }

    #[test]
    fn test_buffer_length_is_validated() {
        let err = to_intensity(&[0u8; 15], 2, 2).unwrap_err();
        match err {
            DetectionError::BufferSizeMismatch { expected, actual, .. } => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 15);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rgba_image_matches_raw_buffer() {
        let image = RgbaImage::from_fn(5, 3, |x, y| Rgba([(x * 40) as u8, (y * 70) as u8, 90, 255]));
        let from_image = rgba_to_intensity(&image);
        let from_raw = to_intensity(image.as_raw(), 5, 3).unwrap();
        assert_eq!(from_image, from_raw);
    }
}
