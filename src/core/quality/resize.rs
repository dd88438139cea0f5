//! SIMD grayscale downscaling for quality analysis.
//!
//! fast_image_resize picks AVX2/NEON kernels at runtime, which matters when
//! every photo in a large dump is reduced before the Laplacian pass.

use crate::error::DecodeError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GrayImage};

/// Dimensions that fit inside a `max_side` square, keeping aspect ratio.
/// Returns `None` when the image already fits.
pub fn fit_within(width: u32, height: u32, max_side: u32) -> Option<(u32, u32)> {
    if max_side == 0 || (width <= max_side && height <= max_side) {
        return None;
    }
    let scale = max_side as f64 / width.max(height) as f64;
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    Some((w, h))
}

/// Reusable grayscale resizer
pub struct GrayResizer {
    resizer: Resizer,
}

impl GrayResizer {
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
        }
    }

    /// Convert to 8-bit luma, then resize to exactly `width` x `height`
    pub fn resize(
        &mut self,
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, DecodeError> {
        let gray = image.to_luma8();
        let (src_width, src_height) = gray.dimensions();
        if src_width == 0 || src_height == 0 || width == 0 || height == 0 {
            return Err(DecodeError::Resize(format!(
                "cannot resize {}x{} to {}x{}",
                src_width, src_height, width, height
            )));
        }

        let src = Image::from_vec_u8(src_width, src_height, gray.into_raw(), PixelType::U8)
            .map_err(|e| DecodeError::Resize(e.to_string()))?;
        let mut dst = Image::new(width, height, PixelType::U8);

        let options =
            ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
        self.resizer
            .resize(&src, &mut dst, &options)
            .map_err(|e| DecodeError::Resize(e.to_string()))?;

        GrayImage::from_raw(width, height, dst.into_vec())
            .ok_or_else(|| DecodeError::Resize("output buffer size mismatch".to_string()))
    }
}

impl Default for GrayResizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn rgb_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 90])
        }))
    }

    #[test]
    fn fit_within_keeps_aspect_ratio() {
        assert_eq!(fit_within(4000, 2000, 1000), Some((1000, 500)));
        assert_eq!(fit_within(300, 1200, 600), Some((150, 600)));
    }

    #[test]
    fn fit_within_leaves_small_images_alone() {
        assert_eq!(fit_within(640, 480, 1024), None);
        assert_eq!(fit_within(640, 480, 0), None);
    }

    #[test]
    fn resize_produces_requested_dimensions() {
        let mut resizer = GrayResizer::new();
        let gray = resizer.resize(&rgb_image(200, 100), 50, 25).unwrap();
        assert_eq!(gray.dimensions(), (50, 25));
    }

    #[test]
    fn zero_target_is_an_error() {
        let mut resizer = GrayResizer::new();
        assert!(resizer.resize(&rgb_image(10, 10), 0, 5).is_err());
    }
}
