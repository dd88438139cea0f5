//! # Metadata Module
//!
//! Resolves when and where a photo was taken.
//!
//! ## Capture date
//! Resolved through an ordered chain; the first resolver with an answer wins:
//! 1. EXIF `DateTimeOriginal`, `DateTimeDigitized`, then `DateTime`
//! 2. A date in the file name (`YYYY-MM-DD`, `YYYYMMDD`, `YYYYMMDDhhmmss`)
//! 3. The file's modification time (always succeeds)
//!
//! Extra resolvers can be appended with [`MetadataExtractor::with_resolver`];
//! they run after the built-in ones and before the modification-time fallback.
//!
//! ## Location
//! Read from the EXIF GPS block and rounded to 5 decimal places. Missing or
//! unparseable GPS data simply means no location.

mod gps;
mod resolvers;

pub use gps::{dms_to_decimal, location_from_exif, GeoLocation};
pub use resolvers::{
    date_from_filename, modified_date, parse_exif_datetime, DateResolver, ExifDateResolver,
    FilenameDateResolver, ResolveContext,
};

use crate::core::scanner::PhotoFile;
use chrono::NaiveDate;
use exif::{Exif, Reader};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

/// Where a capture date came from, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    ExifOriginal,
    ExifDigitized,
    ExifModified,
    Filename,
    FileModified,
}

impl std::fmt::Display for DateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DateSource::ExifOriginal => "exif_original",
            DateSource::ExifDigitized => "exif_digitized",
            DateSource::ExifModified => "exif_modified",
            DateSource::Filename => "filename",
            DateSource::FileModified => "file_modified",
        };
        f.write_str(label)
    }
}

/// Resolved date and location for one photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    pub capture_date: NaiveDate,
    pub date_source: DateSource,
    pub location: Option<GeoLocation>,
}

impl CaptureMetadata {
    /// Location label used in output names and reports
    pub fn location_label(&self) -> String {
        location_label(self.location.as_ref())
    }
}

/// `lat_lon`, or `NoLocation` when absent
pub fn location_label(location: Option<&GeoLocation>) -> String {
    location
        .map(|l| l.to_string())
        .unwrap_or_else(|| "NoLocation".to_string())
}

/// Parse the EXIF block of a file, if it has a readable one
pub fn read_exif(path: &Path) -> Option<Exif> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    Reader::new().read_from_container(&mut reader).ok()
}

/// Runs the date resolver chain and the GPS reader
pub struct MetadataExtractor {
    resolvers: Vec<Box<dyn DateResolver>>,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self {
            resolvers: vec![Box::new(ExifDateResolver), Box::new(FilenameDateResolver)],
        }
    }
}

impl MetadataExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver after the existing ones
    pub fn with_resolver(mut self, resolver: Box<dyn DateResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Names of the configured resolvers, in the order they run
    pub fn resolver_names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// Resolve metadata for a scanned photo. Never fails.
    pub fn extract(&self, photo: &PhotoFile) -> CaptureMetadata {
        let exif = read_exif(&photo.path);
        let ctx = ResolveContext {
            path: &photo.path,
            exif: exif.as_ref(),
            scanned_modified: photo.modified,
        };

        let (capture_date, date_source) = self.resolve_date(&ctx);
        let location = exif.as_ref().and_then(location_from_exif);

        CaptureMetadata {
            capture_date,
            date_source,
            location,
        }
    }

    pub fn resolve_date(&self, ctx: &ResolveContext<'_>) -> (NaiveDate, DateSource) {
        for resolver in &self.resolvers {
            if let Some(found) = resolver.resolve(ctx) {
                trace!(
                    path = %ctx.path.display(),
                    resolver = resolver.name(),
                    "capture date resolved"
                );
                return found;
            }
        }
        (modified_date(ctx), DateSource::FileModified)
    }
}
