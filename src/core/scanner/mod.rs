//! # Scanner Module
//!
//! Discovers candidate photos under an input folder.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//!
//! Extensions are matched case-insensitively. The walk is sorted by file name
//! at every level, so the scan order (and therefore "first seen" during
//! deduplication and tie-breaking during selection) is stable across runs.
//!
//! ## Example
//! ```rust,ignore
//! use photo_curator::core::scanner::{PhotoScanner, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/Users/me/Pictures/export"))?;
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A discovered photo file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoFile {
    pub path: PathBuf,
    /// Last modified time as seen by the scanner
    pub modified: SystemTime,
    pub format: ImageFormat,
}

impl PhotoFile {
    /// Build a `PhotoFile` by stat'ing `path`.
    ///
    /// An unreadable file still yields a value (epoch mtime) so that it
    /// flows through the pipeline and is reported instead of vanishing.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let modified = std::fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let format = ImageFormat::from_path(&path);
        Self {
            path,
            modified,
            format,
        }
    }
}

/// Image formats the curator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            _ => ImageFormat::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(ImageFormat::Unknown)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, ImageFormat::Unknown)
    }
}

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Photos in scan order
    pub photos: Vec<PhotoFile>,
    /// Non-fatal problems hit while walking
    pub errors: Vec<ScanError>,
}

/// Source of candidate photos.
///
/// The pipeline only depends on this trait; tests and embedders can supply
/// their own list of files.
pub trait PhotoScanner: Send + Sync {
    fn scan(&self, root: &Path) -> Result<ScanResult, ScanError>;

    fn scan_with_events(&self, root: &Path, events: &EventSender)
        -> Result<ScanResult, ScanError>;
}
