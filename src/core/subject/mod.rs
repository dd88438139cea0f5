//! # Subject Module
//!
//! Decides whether a photo shows a subject the user cares about. A match puts
//! the photo ahead of every non-matching photo when ranking.
//!
//! The pipeline only sees the [`SubjectMatcher`] trait. The bundled
//! [`ReferenceImageMatcher`] compares gradient hashes against a folder of
//! reference shots; anything smarter (face encodings, classifiers) can be
//! plugged in behind the same trait.

use crate::core::decode::FastDecoder;
use crate::core::scanner::{PhotoScanner, ScanConfig, WalkDirScanner};
use crate::error::ConfigError;
use image::DynamicImage;
use image_hasher::{HashAlg, Hasher, HasherConfig, ImageHash};
use std::path::Path;
use tracing::{info, warn};

/// Hamming distance at or below which two 64-bit hashes are the same shot
pub const DEFAULT_MATCH_THRESHOLD: u32 = 10;

/// Answers "does this photo contain the subject?"
pub trait SubjectMatcher: Send + Sync {
    fn matches(&self, image: &DynamicImage) -> bool;
}

/// Matches photos that look like any image in a reference set
pub struct ReferenceImageMatcher {
    hasher: Hasher,
    references: Vec<ImageHash>,
    threshold: u32,
}

fn gradient_hasher() -> Hasher {
    HasherConfig::new()
        .hash_size(8, 8)
        .hash_alg(HashAlg::Gradient)
        .to_hasher()
}

impl ReferenceImageMatcher {
    /// Build from already decoded reference images
    pub fn from_images(images: &[DynamicImage], threshold: u32) -> Self {
        let hasher = gradient_hasher();
        let references = images.iter().map(|img| hasher.hash_image(img)).collect();
        Self {
            hasher,
            references,
            threshold,
        }
    }

    /// Load every supported image under `dir`. Unreadable references are
    /// skipped with a warning; a missing folder is a configuration error.
    pub fn from_dir(dir: &Path, threshold: u32) -> Result<Self, ConfigError> {
        if !dir.is_dir() {
            return Err(ConfigError::ReferenceNotFound {
                path: dir.to_path_buf(),
            });
        }

        let scan = WalkDirScanner::new(ScanConfig::default())
            .scan(dir)
            .map_err(|_| ConfigError::ReferenceNotFound {
                path: dir.to_path_buf(),
            })?;

        let hasher = gradient_hasher();
        let mut references = Vec::with_capacity(scan.photos.len());
        for photo in &scan.photos {
            match FastDecoder::decode(&photo.path) {
                Ok(image) => references.push(hasher.hash_image(&image)),
                Err(e) => {
                    warn!(path = %photo.path.display(), error = %e, "skipping reference image")
                }
            }
        }

        info!(dir = %dir.display(), references = references.len(), "loaded reference images");
        Ok(Self {
            hasher,
            references,
            threshold,
        })
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl SubjectMatcher for ReferenceImageMatcher {
    fn matches(&self, image: &DynamicImage) -> bool {
        if self.references.is_empty() {
            return false;
        }
        let hash = self.hasher.hash_image(image);
        self.references
            .iter()
            .any(|reference| reference.dist(&hash) <= self.threshold)
    }
}
