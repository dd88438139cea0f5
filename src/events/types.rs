//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the curation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory walking
    Scan(ScanEvent),
    /// Fingerprinting, metadata extraction and scoring
    Analyze(AnalyzeEvent),
    /// Grouping and ranked selection
    Select(SelectEvent),
    /// Copying selected photos to the output folder
    Materialize(MaterializeEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    Started { root: PathBuf },
    PhotoFound { path: PathBuf },
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    Completed { total_photos: usize },
}

/// Events during per-file analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnalyzeEvent {
    Started { total_photos: usize },
    Progress(AnalyzeProgress),
    /// Byte-identical to a photo scanned earlier
    DuplicateSkipped { path: PathBuf, original: PathBuf },
    /// Pixels could not be decoded; the photo scores zero
    DecodeFailed { path: PathBuf, message: String },
    Completed {
        unique_photos: usize,
        duplicates: usize,
    },
}

/// Progress information during analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeProgress {
    pub completed: usize,
    pub total: usize,
    pub current_path: PathBuf,
}

/// Events during grouping and selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SelectEvent {
    EventsFormed { events: usize },
    Completed { selected: usize },
}

/// Events during materialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MaterializeEvent {
    Started { total: usize },
    Copied {
        rank: usize,
        source: PathBuf,
        destination: PathBuf,
    },
    Failed { source: PathBuf, message: String },
    ReportWritten { path: PathBuf },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    Started,
    PhaseChanged { phase: PipelinePhase },
    Completed { summary: RunSummary },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Fingerprinting,
    Analyzing,
    Selecting,
    Materializing,
    Reporting,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PipelinePhase::Scanning => "Scanning",
            PipelinePhase::Fingerprinting => "Fingerprinting",
            PipelinePhase::Analyzing => "Analyzing",
            PipelinePhase::Selecting => "Selecting",
            PipelinePhase::Materializing => "Copying",
            PipelinePhase::Reporting => "Reporting",
        };
        f.write_str(label)
    }
}

/// Totals for one curation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub scanned: usize,
    pub unique: usize,
    pub duplicates: usize,
    pub decode_failures: usize,
    pub events: usize,
    pub selected: usize,
    pub materialized: usize,
    pub failed: usize,
    /// Wall-clock duration; excluded from equality-sensitive report output
    #[serde(skip)]
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Analyze(AnalyzeEvent::Progress(AnalyzeProgress {
            completed: 10,
            total: 50,
            current_path: PathBuf::from("/photos/a.jpg"),
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Analyze(AnalyzeEvent::Progress(p)) => assert_eq!(p.total, 50),
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn summary_json_omits_duration() {
        let summary = RunSummary {
            scanned: 3,
            duration_ms: 1234,
            ..Default::default()
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"scanned\":3"));
        assert!(!json.contains("1234"));
    }

    #[test]
    fn phase_display_is_human_readable() {
        assert_eq!(PipelinePhase::Materializing.to_string(), "Copying");
    }
}
