//! Image decoding with format-specific fast paths.
//!
//! JPEGs go through zune-jpeg, everything else (and any JPEG zune rejects)
//! through the image crate.

mod bytes;

pub use bytes::{read_file_bytes, FileBytes, MMAP_THRESHOLD};

use crate::core::scanner::ImageFormat;
use crate::error::DecodeError;
use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Stateless decoder front-end
pub struct FastDecoder;

impl FastDecoder {
    /// Read and decode the image at `path`
    pub fn decode(path: &Path) -> Result<DynamicImage, DecodeError> {
        let bytes = read_file_bytes(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode_bytes(path, &bytes)
    }

    /// Decode already-read file contents. `path` is used for format
    /// detection and error messages only.
    pub fn decode_bytes(path: &Path, bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
        let image = match ImageFormat::from_path(path) {
            ImageFormat::Jpeg => {
                Self::decode_jpeg(path, bytes).or_else(|_| Self::decode_fallback(path, bytes))
            }
            _ => Self::decode_fallback(path, bytes),
        }?;

        if image.width() == 0 || image.height() == 0 {
            return Err(DecodeError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(image)
    }

    fn decode_jpeg(path: &Path, bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
        let corrupt = |reason: String| DecodeError::Corrupt {
            path: path.to_path_buf(),
            reason,
        };

        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder
            .decode()
            .map_err(|e| corrupt(format!("zune-jpeg decode failed: {:?}", e)))?;
        let info = decoder
            .info()
            .ok_or_else(|| corrupt("missing JPEG frame info".to_string()))?;

        let width = info.width as u32;
        let height = info.height as u32;

        let image = match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, pixels)
                .map(DynamicImage::ImageRgb8),
            ColorSpace::RGBA => ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, pixels)
                .map(DynamicImage::ImageRgba8),
            ColorSpace::Luma => ImageBuffer::<Luma<u8>, _>::from_raw(width, height, pixels)
                .map(DynamicImage::ImageLuma8),
            other => return Err(corrupt(format!("unsupported colorspace {:?}", other))),
        };

        image.ok_or_else(|| corrupt("pixel buffer does not match dimensions".to_string()))
    }

    fn decode_fallback(path: &Path, bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
        image::load_from_memory(bytes).map_err(|e| DecodeError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
