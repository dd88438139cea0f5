//! # Error Module
//!
//! User-friendly error types for the photo curator.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Per-file failures are data** - decode and copy failures are recorded
//!   in the report, only configuration problems stop a run

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum CuratorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Materialization error: {0}")]
    Materialize(#[from] MaterializeError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

/// Invalid settings, detected before any file is touched
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Per-event limit must be at least 1 (got {value})")]
    InvalidPerEventLimit { value: usize },

    #[error("Global limit must be at least 1 (got {value})")]
    InvalidGlobalLimit { value: usize },

    #[error("Concurrency must be at least 1 (got {value})")]
    InvalidConcurrency { value: usize },

    #[error("No input given. Pass an input folder or a list of photos.")]
    MissingInput,

    #[error("Input folder not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Output folder {output} is inside the input folder {input}. Choose a folder outside the photos being curated.")]
    OutputInsideInput { input: PathBuf, output: PathBuf },

    #[error("Reference folder not found: {path}")]
    ReferenceNotFound { path: PathBuf },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),
}

/// Errors that occur while discovering photos
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// The file or folder the problem was hit on
    pub fn path(&self) -> &Path {
        match self {
            ScanError::DirectoryNotFound { path }
            | ScanError::PermissionDenied { path }
            | ScanError::ReadDirectory { path, .. } => path,
        }
    }
}

/// Errors that occur while decoding image pixels
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to decode image {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Image has no pixels: {path}")]
    Empty { path: PathBuf },

    #[error("Failed to open image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Resize failed: {0}")]
    Resize(String),
}

/// Errors that occur while writing selected photos to the output folder
#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("Failed to create output folder {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {source_path} to {destination}: {source}")]
    Copy {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while persisting the curation report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, CuratorError>;
