//! # Reporter Module
//!
//! The audit trail of a curation run.
//!
//! Every copied photo gets one [`ReportRow`] saying where it came from, where
//! it went and why it ranked where it did. The report also lists skipped
//! duplicates, copies that failed, and the run totals.
//!
//! Reports contain nothing run-specific (no timestamps, no durations, no ids),
//! so curating the same input twice produces byte-identical reports.

mod export;

pub use export::{
    csv_escape, export_csv, export_duplicates_csv, export_failures_csv, export_json,
    write_duplicate_audit, write_failure_audit, write_report, DUPLICATES_FILE_NAME,
    FAILURES_FILE_NAME,
};

use crate::core::materialize::{CopyFailure, MaterializeOutcome};
use crate::core::metadata::DateSource;
use crate::core::selection::SelectedImage;
use crate::error::ScanError;
use crate::events::RunSummary;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Report file format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

impl ReportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "curated_photos_report.csv",
            ReportFormat::Json => "curated_photos_report.json",
        }
    }
}

/// One copied photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub rank: usize,
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub capture_date: NaiveDate,
    pub date_source: DateSource,
    pub location: String,
    /// Score including the subject bonus
    pub quality_score: f64,
    pub sharpness: f64,
    pub brightness: f64,
    pub contrast: f64,
    pub resolution: u64,
    pub subject_match: bool,
    pub fingerprint: String,
}

impl ReportRow {
    pub const FIELDS: [&'static str; 13] = [
        "rank",
        "source_path",
        "destination_path",
        "capture_date",
        "date_source",
        "location",
        "quality_score",
        "sharpness",
        "brightness",
        "contrast",
        "resolution",
        "subject_match",
        "fingerprint",
    ];

    /// Values in [`FIELDS`](Self::FIELDS) order
    pub fn values(&self) -> [String; 13] {
        [
            self.rank.to_string(),
            self.source_path.display().to_string(),
            self.destination_path.display().to_string(),
            self.capture_date.format("%Y-%m-%d").to_string(),
            self.date_source.to_string(),
            self.location.clone(),
            self.quality_score.to_string(),
            self.sharpness.to_string(),
            self.brightness.to_string(),
            self.contrast.to_string(),
            self.resolution.to_string(),
            self.subject_match.to_string(),
            self.fingerprint.clone(),
        ]
    }
}

/// A photo skipped because an earlier-scanned file had the same bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    pub path: PathBuf,
    pub original: PathBuf,
}

/// A file or folder the walker could not read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProblem {
    pub path: PathBuf,
    pub message: String,
}

impl From<&ScanError> for ScanProblem {
    fn from(error: &ScanError) -> Self {
        Self {
            path: error.path().to_path_buf(),
            message: error.to_string(),
        }
    }
}

/// Everything written to the report file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurationReport {
    pub rows: Vec<ReportRow>,
    pub duplicates: Vec<DuplicateEntry>,
    pub failures: Vec<CopyFailure>,
    pub scan_errors: Vec<ScanProblem>,
    pub summary: RunSummary,
}

impl CurationReport {
    /// Rows for every selected photo that was materialized, in rank order
    pub fn build(
        selected: &[SelectedImage],
        outcome: &MaterializeOutcome,
        duplicates: Vec<DuplicateEntry>,
        summary: RunSummary,
    ) -> Self {
        let destinations: HashMap<usize, &PathBuf> = outcome
            .copied
            .iter()
            .map(|c| (c.rank, &c.destination))
            .collect();

        let rows = selected
            .iter()
            .filter_map(|s| {
                let destination = destinations.get(&s.rank)?;
                let record = &s.record;
                Some(ReportRow {
                    rank: s.rank,
                    source_path: record.source_path.clone(),
                    destination_path: (*destination).clone(),
                    capture_date: record.capture_date,
                    date_source: record.date_source,
                    location: record.location_label(),
                    quality_score: record.combined_score(),
                    sharpness: record.quality.signals.sharpness,
                    brightness: record.quality.signals.brightness,
                    contrast: record.quality.signals.contrast,
                    resolution: record.quality.signals.resolution,
                    subject_match: record.subject_match,
                    fingerprint: record.fingerprint.to_string(),
                })
            })
            .collect();

        Self {
            rows,
            duplicates,
            failures: outcome.failures.clone(),
            scan_errors: Vec::new(),
            summary,
        }
    }

    pub fn with_scan_errors(mut self, scan_errors: Vec<ScanProblem>) -> Self {
        self.scan_errors = scan_errors;
        self
    }

    /// Flat field/value pairs, one list per row
    pub fn rows(&self) -> Vec<Vec<(&'static str, String)>> {
        self.rows
            .iter()
            .map(|row| ReportRow::FIELDS.into_iter().zip(row.values()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::materialize::PlannedCopy;
    use crate::core::record::test_support::record;

    fn selected(rank: usize, scan_index: usize) -> SelectedImage {
        SelectedImage {
            rank,
            record: record(scan_index, (2024, 6, 1), 10.0 * rank as f64),
        }
    }

    fn copied(rank: usize) -> PlannedCopy {
        PlannedCopy {
            rank,
            source: PathBuf::from(format!("/photos/day/img_{rank}.jpg")),
            destination: PathBuf::from(format!("/out/{rank}.jpg")),
        }
    }

    #[test]
    fn failed_copies_have_no_row() {
        let picks = vec![selected(1, 0), selected(2, 1)];
        let outcome = MaterializeOutcome {
            copied: vec![copied(2)],
            failures: vec![CopyFailure {
                rank: 1,
                source: PathBuf::from("/photos/day/img_0.jpg"),
                destination: PathBuf::from("/out/1.jpg"),
                message: "disk full".to_string(),
            }],
            dry_run: false,
        };

        let report = CurationReport::build(&picks, &outcome, Vec::new(), RunSummary::default());
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].rank, 2);
        assert_eq!(report.rows[0].destination_path, PathBuf::from("/out/2.jpg"));
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn rows_expose_field_value_pairs() {
        let picks = vec![selected(1, 4)];
        let outcome = MaterializeOutcome {
            copied: vec![copied(1)],
            ..Default::default()
        };

        let report = CurationReport::build(&picks, &outcome, Vec::new(), RunSummary::default());
        let rows = report.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 13);
        assert_eq!(rows[0][0], ("rank", "1".to_string()));
        assert_eq!(rows[0][3], ("capture_date", "2024-06-01".to_string()));
        assert_eq!(rows[0][4], ("date_source", "exif_original".to_string()));
        assert_eq!(rows[0][5], ("location", "NoLocation".to_string()));
        assert_eq!(rows[0][6], ("quality_score", "10".to_string()));
    }

    #[test]
    fn scan_problems_keep_the_offending_path() {
        let error = ScanError::PermissionDenied {
            path: PathBuf::from("/photos/locked"),
        };
        let report = CurationReport::default().with_scan_errors(vec![(&error).into()]);

        assert_eq!(report.scan_errors[0].path, PathBuf::from("/photos/locked"));
        assert!(report.scan_errors[0].message.contains("Permission denied"));
    }

    #[test]
    fn report_file_names() {
        assert_eq!(ReportFormat::Csv.file_name(), "curated_photos_report.csv");
        assert_eq!(ReportFormat::Json.file_name(), "curated_photos_report.json");
    }
}
