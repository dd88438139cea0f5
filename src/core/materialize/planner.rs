//! Destination naming for selected photos.
//!
//! Names are built from the rank, so two selected photos can never be given
//! the same destination within one run.

use super::types::{OutputLayout, PlannedCopy};
use crate::core::record::ImageRecord;
use crate::core::selection::SelectedImage;
use std::path::{Path, PathBuf};

/// `{date}_{location}_{parent}_{rank}{.ext}`, extension case preserved
pub fn destination_name(record: &ImageRecord, rank: usize) -> String {
    let ext = record
        .source_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    format!(
        "{}_{}_{}_{}{}",
        record.capture_date.format("%Y-%m-%d"),
        record.location_label(),
        record.parent_folder_name(),
        rank,
        ext
    )
}

/// Path relative to the output folder for the given layout
pub fn relative_destination(layout: OutputLayout, record: &ImageRecord, rank: usize) -> PathBuf {
    let name = destination_name(record, rank);
    match layout {
        OutputLayout::Flat => PathBuf::from(name),
        OutputLayout::Nested => PathBuf::from(record.capture_date.format("%Y-%m").to_string())
            .join(record.capture_date.format("%Y-%m-%d").to_string())
            .join(name),
    }
}

/// Assign destinations in rank order
pub fn plan_copies(
    selected: &[SelectedImage],
    output_root: &Path,
    layout: OutputLayout,
) -> Vec<PlannedCopy> {
    selected
        .iter()
        .map(|s| PlannedCopy {
            rank: s.rank,
            source: s.record.source_path.clone(),
            destination: output_root.join(relative_destination(layout, &s.record, s.rank)),
        })
        .collect()
}
