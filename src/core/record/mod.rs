//! # Record Module
//!
//! [`ImageRecord`] is everything the pipeline learned about one unique photo.
//! Records are built once per file after deduplication and never modified.

use crate::core::fingerprint::ContentFingerprint;
use crate::core::metadata::{location_label, CaptureMetadata, DateSource, GeoLocation};
use crate::core::quality::{combined_score, QualityScore, RankKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Analysis results for one photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub source_path: PathBuf,
    /// Position in the deterministic input order
    pub scan_index: usize,
    pub fingerprint: ContentFingerprint,
    pub capture_date: NaiveDate,
    pub date_source: DateSource,
    pub location: Option<GeoLocation>,
    pub quality: QualityScore,
    pub subject_match: bool,
}

impl ImageRecord {
    pub fn new(
        source_path: PathBuf,
        scan_index: usize,
        fingerprint: ContentFingerprint,
        metadata: CaptureMetadata,
        quality: QualityScore,
        subject_match: bool,
    ) -> Self {
        Self {
            source_path,
            scan_index,
            fingerprint,
            capture_date: metadata.capture_date,
            date_source: metadata.date_source,
            location: metadata.location,
            quality,
            subject_match,
        }
    }

    pub fn rank_key(&self) -> RankKey {
        RankKey {
            subject_match: self.subject_match,
            score: self.quality.score,
            decoded: self.quality.decoded,
            scan_index: self.scan_index,
        }
    }

    /// Quality score with the subject bonus applied
    pub fn combined_score(&self) -> f64 {
        combined_score(self.quality.score, self.subject_match)
    }

    /// `lat_lon` or `NoLocation`
    pub fn location_label(&self) -> String {
        location_label(self.location.as_ref())
    }

    /// Name of the folder directly containing the source file, `root` if none
    pub fn parent_folder_name(&self) -> String {
        parent_folder_name(&self.source_path)
    }
}

pub fn parent_folder_name(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "root".to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::quality::QualitySignals;

    /// Decoded record with a given score and date, fingerprinted by index
    pub fn record(scan_index: usize, date: (i32, u32, u32), score: f64) -> ImageRecord {
        ImageRecord {
            source_path: PathBuf::from(format!("/photos/day/img_{scan_index}.jpg")),
            scan_index,
            fingerprint: ContentFingerprint::Digest(scan_index as u128),
            capture_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            date_source: DateSource::ExifOriginal,
            location: None,
            quality: QualityScore {
                signals: QualitySignals::default(),
                score,
                decoded: true,
            },
            subject_match: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::record;
    use super::*;

    #[test]
    fn parent_folder_is_immediate_directory() {
        assert_eq!(parent_folder_name(Path::new("/a/holiday/img.jpg")), "holiday");
        assert_eq!(parent_folder_name(Path::new("img.jpg")), "root");
        assert_eq!(parent_folder_name(Path::new("/img.jpg")), "root");
    }

    #[test]
    fn rank_key_mirrors_record() {
        let mut rec = record(3, (2024, 6, 1), 42.0);
        rec.subject_match = true;
        let key = rec.rank_key();
        assert_eq!(key.scan_index, 3);
        assert_eq!(key.score, 42.0);
        assert!(key.subject_match && key.decoded);
        assert_eq!(rec.combined_score(), 1042.0);
    }
}
