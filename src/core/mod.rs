//! # Core Module
//!
//! The UI-agnostic curation engine.
//!
//! ## Modules
//! - `scanner` - Discovers photos in a folder, in a reproducible order
//! - `decode` - Reads and decodes image files
//! - `fingerprint` - Content digests for exact-duplicate detection
//! - `metadata` - Capture date and location with fallbacks
//! - `quality` - Sharpness, brightness, contrast and resolution scoring
//! - `subject` - Optional "is this the person I care about?" matching
//! - `record` - Per-photo analysis results
//! - `grouping` - Groups photos into events by capture date
//! - `selection` - Per-event and global ranked selection
//! - `materialize` - Copies the selection under collision-free names
//! - `reporter` - The audit trail of a run
//! - `pipeline` - Orchestrates the full workflow

pub mod decode;
pub mod fingerprint;
pub mod grouping;
pub mod materialize;
pub mod metadata;
pub mod pipeline;
pub mod quality;
pub mod record;
pub mod reporter;
pub mod scanner;
pub mod selection;
pub mod subject;

// Re-export commonly used types
pub use fingerprint::ContentFingerprint;
pub use metadata::{CaptureMetadata, DateSource, GeoLocation};
pub use quality::QualityScore;
pub use record::ImageRecord;
pub use reporter::CurationReport;
pub use scanner::PhotoFile;
pub use selection::{SelectedImage, SelectionPolicy};
