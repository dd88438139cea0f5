//! # Quality Analysis Module
//!
//! Scores how desirable a photo is from four pixel signals:
//!
//! | Signal     | Measure                                      | Weight |
//! |------------|----------------------------------------------|--------|
//! | sharpness  | variance of the 3x3 Laplacian response       | 0.4    |
//! | brightness | mean gray intensity                          | 0.2    |
//! | contrast   | population standard deviation of intensity   | 0.2    |
//! | resolution | width x height, in megapixels                | 0.2    |
//!
//! A photo that cannot be decoded scores exactly 0 on everything and is
//! flagged `decoded = false`, so it can only be chosen when nothing else is
//! left in its event.
//!
//! Ranking order lives in [`RankKey`].

mod rank;
mod resize;

pub use rank::{combined_score, RankKey, SUBJECT_PRIORITY_BONUS};
pub use resize::{fit_within, GrayResizer};

use crate::core::decode::FastDecoder;
use crate::error::DecodeError;
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

pub const SHARPNESS_WEIGHT: f64 = 0.4;
pub const BRIGHTNESS_WEIGHT: f64 = 0.2;
pub const CONTRAST_WEIGHT: f64 = 0.2;
pub const RESOLUTION_WEIGHT: f64 = 0.2;

/// Raw measurements behind a score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualitySignals {
    pub sharpness: f64,
    pub brightness: f64,
    pub contrast: f64,
    /// Pixel count of the original image
    pub resolution: u64,
}

impl QualitySignals {
    /// Weighted sum of the signals
    pub fn weighted_score(&self) -> f64 {
        SHARPNESS_WEIGHT * self.sharpness
            + BRIGHTNESS_WEIGHT * self.brightness
            + CONTRAST_WEIGHT * self.contrast
            + RESOLUTION_WEIGHT * (self.resolution as f64 / 1e6)
    }
}

/// Quality of one photo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    pub signals: QualitySignals,
    pub score: f64,
    /// `false` when the pixels could not be read
    pub decoded: bool,
}

impl QualityScore {
    pub fn from_signals(signals: QualitySignals) -> Self {
        Self {
            score: signals.weighted_score(),
            signals,
            decoded: true,
        }
    }

    /// The score given to undecodable files
    pub fn failed() -> Self {
        Self {
            signals: QualitySignals::default(),
            score: 0.0,
            decoded: false,
        }
    }

    /// Placeholder when scoring is turned off. All skipped scores tie, so
    /// ranking falls through to scan order.
    pub fn skipped() -> Self {
        Self {
            signals: QualitySignals::default(),
            score: 0.0,
            decoded: true,
        }
    }
}

/// Computes [`QualityScore`]s
#[derive(Debug, Clone, Default)]
pub struct QualityAnalyzer {
    /// Longest side to analyze at; `None` analyzes at full resolution
    analysis_size: Option<u32>,
}

impl QualityAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Downscale so the longest side is at most `max_side` before measuring
    /// sharpness, brightness and contrast
    pub fn with_analysis_size(max_side: u32) -> Self {
        Self {
            analysis_size: Some(max_side),
        }
    }

    pub fn analysis_size(&self) -> Option<u32> {
        self.analysis_size
    }

    /// Decode and score a file
    pub fn analyze_file(&self, path: &Path) -> Result<QualityScore, DecodeError> {
        let image = FastDecoder::decode(path)?;
        Ok(self.analyze_image(&image))
    }

    /// Like [`analyze_file`](Self::analyze_file), but decode failures become
    /// [`QualityScore::failed`]
    pub fn score_file(&self, path: &Path) -> QualityScore {
        match self.analyze_file(path) {
            Ok(score) => score,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "scoring as undecodable");
                QualityScore::failed()
            }
        }
    }

    /// Score an already decoded image
    pub fn analyze_image(&self, image: &DynamicImage) -> QualityScore {
        let resolution = image.width() as u64 * image.height() as u64;
        let gray = self.analysis_gray(image);

        let (brightness, contrast) = mean_and_std_dev(&gray);
        QualityScore::from_signals(QualitySignals {
            sharpness: laplacian_variance(&gray),
            brightness,
            contrast,
            resolution,
        })
    }

    fn analysis_gray(&self, image: &DynamicImage) -> GrayImage {
        let target = self
            .analysis_size
            .and_then(|max_side| fit_within(image.width(), image.height(), max_side));

        match target {
            Some((width, height)) => match GrayResizer::new().resize(image, width, height) {
                Ok(gray) => gray,
                Err(e) => {
                    warn!(error = %e, "downscale failed, analyzing at full resolution");
                    image.to_luma8()
                }
            },
            None => image.to_luma8(),
        }
    }
}

/// Variance of the 4-neighbour Laplacian over every pixel.
///
/// Neighbours outside the image are mirrored without repeating the edge
/// pixel, so index -1 reads index 1 and index `n` reads `n - 2`.
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }

    let (w, h) = (width as usize, height as usize);
    let px = gray.as_raw();
    let at = |x: usize, y: usize| px[y * w + x] as f64;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;

    for y in 0..h {
        let (up, down) = (mirror(y as isize - 1, h), mirror(y as isize + 1, h));
        for x in 0..w {
            let (left, right) = (mirror(x as isize - 1, w), mirror(x as isize + 1, w));
            let lap = at(x, up) + at(x, down) + at(left, y) + at(right, y) - 4.0 * at(x, y);
            sum += lap;
            sum_sq += lap * lap;
        }
    }

    let n = (w * h) as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

/// Reflect an index one step past either end of `0..len`
fn mirror(index: isize, len: usize) -> usize {
    if len == 1 {
        0
    } else if index < 0 {
        index.unsigned_abs()
    } else if index as usize >= len {
        2 * len - 2 - index as usize
    } else {
        index as usize
    }
}

/// Mean intensity and population standard deviation
pub fn mean_and_std_dev(gray: &GrayImage) -> (f64, f64) {
    let px = gray.as_raw();
    if px.is_empty() {
        return (0.0, 0.0);
    }

    let n = px.len() as f64;
    let mean = px.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = px
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    fn uniform(value: u8, width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(ImageBuffer::from_fn(width, height, |_, _| Luma([value])))
    }

    fn checkerboard(size: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(ImageBuffer::from_fn(size, size, |x, y| {
            Luma([if (x + y) % 2 == 0 { 0 } else { 255 }])
        }))
    }

    #[test]
    fn uniform_image_is_flat() {
        let score = QualityAnalyzer::new().analyze_image(&uniform(100, 100, 100));

        assert_eq!(score.signals.sharpness, 0.0);
        assert_eq!(score.signals.contrast, 0.0);
        assert!((score.signals.brightness - 100.0).abs() < 1e-9);
        assert_eq!(score.signals.resolution, 10_000);
        assert!(score.decoded);
    }

    #[test]
    fn score_uses_fixed_weights() {
        let score = QualityAnalyzer::new().analyze_image(&uniform(100, 100, 100));
        // 0.2 * 100 brightness + 0.2 * 0.01 megapixels
        assert!((score.score - 20.002).abs() < 1e-9, "got {}", score.score);
    }

    #[test]
    fn checkerboard_is_sharp_and_contrasty() {
        let score = QualityAnalyzer::new().analyze_image(&checkerboard(32));

        // Every Laplacian is +/-1020, edges included, so the variance is 1020^2
        assert!((score.signals.sharpness - 1_040_400.0).abs() < 1e-3);
        assert!((score.signals.contrast - 127.5).abs() < 1e-9);
        assert!((score.signals.brightness - 127.5).abs() < 1e-9);
    }

    #[test]
    fn sharper_image_scores_higher() {
        let analyzer = QualityAnalyzer::new();
        let flat = analyzer.analyze_image(&uniform(128, 32, 32));
        let sharp = analyzer.analyze_image(&checkerboard(32));
        assert!(sharp.score > flat.score);
    }

    #[test]
    fn narrow_images_still_measure_sharpness() {
        let stripes = ImageBuffer::from_fn(2, 50, |x, y| {
            Luma([if (x + y) % 2 == 0 { 0u8 } else { 255 }])
        });
        assert!((laplacian_variance(&stripes) - 1_040_400.0).abs() < 1e-3);
        assert_eq!(laplacian_variance(&uniform(200, 2, 50).to_luma8()), 0.0);
    }

    #[test]
    fn edges_mirror_their_inner_neighbour() {
        // One row, so up and down both read the pixel itself.
        // Both edges read the middle pixel twice.
        let row: GrayImage = ImageBuffer::from_raw(3, 1, vec![0u8, 2, 8]).unwrap();
        let laps = [4.0f64, 4.0, -12.0];
        let mean = laps.iter().sum::<f64>() / 3.0;
        let expected = laps.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / 3.0;
        assert!((laplacian_variance(&row) - expected).abs() < 1e-9);
    }

    #[test]
    fn single_pixel_has_no_laplacian() {
        assert_eq!(laplacian_variance(&uniform(9, 1, 1).to_luma8()), 0.0);
    }

    #[test]
    fn downscaling_keeps_original_resolution() {
        let analyzer = QualityAnalyzer::with_analysis_size(100);
        let score = analyzer.analyze_image(&uniform(60, 400, 200));

        assert_eq!(score.signals.resolution, 80_000);
        assert!((score.signals.brightness - 60.0).abs() < 1.0);
        assert_eq!(analyzer.analysis_size(), Some(100));
    }

    #[test]
    fn failed_score_is_all_zero() {
        let failed = QualityScore::failed();
        assert_eq!(failed.score, 0.0);
        assert_eq!(failed.signals, QualitySignals::default());
        assert!(!failed.decoded);
    }

    #[test]
    fn unreadable_file_scores_as_failed() {
        let score = QualityAnalyzer::new().score_file(Path::new("/nonexistent/a.jpg"));
        assert_eq!(score, QualityScore::failed());
    }
}
