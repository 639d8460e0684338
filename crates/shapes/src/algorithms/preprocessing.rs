use image::GrayImage;
use crate::{
    error::{DetectionError, Result},
    traits::IntensityPreprocessor,
};

/// Gaussian blur preprocessor for noise reduction
#[derive(Debug, Clone)]
pub struct GaussianBlurPreprocessor {
    pub sigma: f32,
}

impl Default for GaussianBlurPreprocessor {
    fn default() -> Self {
        Self { sigma: 1.0 }
    }
}

impl IntensityPreprocessor for GaussianBlurPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        // imageproc panics on a non-positive sigma
        if self.sigma.is_nan() || self.sigma <= 0.0 {
            return Err(DetectionError::ImageProcessing(format!(
                "gaussian blur sigma must be positive, got {}",
                self.sigma
            )));
        }
        Ok(imageproc::filter::gaussian_blur_f32(image, self.sigma))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_blur_softens_step_edge() {
        let image = GrayImage::from_fn(20, 20, |x, _| if x < 10 { Luma([0u8]) } else { Luma([255u8]) });
        let blurred = GaussianBlurPreprocessor { sigma: 1.5 }.preprocess(&image).unwrap();

        let left = blurred.get_pixel(9, 10).0[0];
        let right = blurred.get_pixel(10, 10).0[0];
        assert!(left > 0 && left < 128, "left edge pixel {left}");
        assert!(right > 128 && right < 255, "right edge pixel {right}");
        assert_eq!(blurred.get_pixel(0, 10).0[0], 0);
    }

    #[test]
    fn test_blur_rejects_non_positive_sigma() {
        let image = GrayImage::new(4, 4);
        assert!(GaussianBlurPreprocessor { sigma: 0.0 }.preprocess(&image).is_err());
        assert!(GaussianBlurPreprocessor { sigma: f32::NAN }.preprocess(&image).is_err());
    }
}
