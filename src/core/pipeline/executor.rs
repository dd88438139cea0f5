//! Pipeline execution implementation.

use super::config::{CurationConfig, CurationMode};
use crate::core::decode::FastDecoder;
use crate::core::fingerprint::{ContentFingerprint, FingerprintRegistry};
use crate::core::grouping::group_by_event;
use crate::core::materialize::{plan_copies, MaterializeOutcome, Materializer, OutputLayout};
use crate::core::metadata::{DateResolver, MetadataExtractor};
use crate::core::quality::{QualityAnalyzer, QualityScore};
use crate::core::record::ImageRecord;
use crate::core::reporter::{
    write_duplicate_audit, write_failure_audit, write_report, CurationReport, DuplicateEntry,
    ReportFormat, ScanProblem,
};
use crate::core::scanner::{PhotoFile, PhotoScanner, ScanConfig, WalkDirScanner};
use crate::core::selection::{SelectedImage, SelectionPolicy};
use crate::core::subject::{ReferenceImageMatcher, SubjectMatcher};
use crate::error::{ConfigError, CuratorError};
use crate::events::{
    null_sender, AnalyzeEvent, AnalyzeProgress, Event, EventSender, MaterializeEvent,
    PipelineEvent, PipelinePhase, RunSummary, SelectEvent,
};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// The report as written to disk
    pub report: CurationReport,
    pub report_path: PathBuf,
    /// Duplicate audit, written alongside CSV reports
    pub duplicate_audit_path: Option<PathBuf>,
    /// Failed copies and unreadable input, written alongside CSV reports
    pub failure_audit_path: Option<PathBuf>,
    /// Selected photos in rank order, including any whose copy failed
    pub selected: Vec<SelectedImage>,
    /// Totals, including the wall-clock duration
    pub summary: RunSummary,
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: CurationConfig,
    matcher: Option<Arc<dyn SubjectMatcher>>,
    extra_resolvers: Vec<Box<dyn DateResolver>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: CurationConfig::default(),
            matcher: None,
            extra_resolvers: Vec::new(),
        }
    }

    /// Start from a complete configuration
    pub fn config(mut self, config: CurationConfig) -> Self {
        self.config = config;
        self
    }

    /// Folder to scan
    pub fn input(mut self, input: impl Into<PathBuf>) -> Self {
        self.config.input = Some(input.into());
        self
    }

    /// Folder to write curated photos and the report to
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.config.output = output.into();
        self
    }

    /// Photos kept per event; `None` keeps all
    pub fn per_event_limit(mut self, limit: Option<usize>) -> Self {
        self.config.selection.per_event_limit = limit;
        self
    }

    /// Photos kept overall; `None` keeps all
    pub fn global_limit(mut self, limit: Option<usize>) -> Self {
        self.config.selection.global_limit = limit;
        self
    }

    pub fn selection(mut self, selection: SelectionPolicy) -> Self {
        self.config.selection = selection;
        self
    }

    pub fn mode(mut self, mode: CurationMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Prioritize photos resembling the images in `dir`
    pub fn reference_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.reference_dir = Some(dir.into());
        self
    }

    pub fn match_threshold(mut self, threshold: u32) -> Self {
        self.config.match_threshold = threshold;
        self
    }

    /// Use a custom subject matcher instead of a reference folder
    pub fn subject_matcher(mut self, matcher: Arc<dyn SubjectMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Append a capture-date resolver, tried after the built-in ones
    pub fn date_resolver(mut self, resolver: Box<dyn DateResolver>) -> Self {
        self.extra_resolvers.push(resolver);
        self
    }

    pub fn concurrency(mut self, workers: usize) -> Self {
        self.config.concurrency = Some(workers);
        self
    }

    pub fn layout(mut self, layout: OutputLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn report_format(mut self, format: ReportFormat) -> Self {
        self.config.report_format = format;
        self
    }

    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Leave out dot-files and dot-directories
    pub fn skip_hidden(mut self, skip: bool) -> Self {
        self.config.scan_config.skip_hidden = skip;
        self
    }

    pub fn analysis_size(mut self, max_side: Option<u32>) -> Self {
        self.config.analysis_size = max_side;
        self
    }

    /// Plan and report without copying
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    pub fn build(self) -> Pipeline {
        let extractor = self
            .extra_resolvers
            .into_iter()
            .fold(MetadataExtractor::new(), |ex, r| ex.with_resolver(r));
        let analyzer = match self.config.analysis_size {
            Some(max_side) => QualityAnalyzer::with_analysis_size(max_side),
            None => QualityAnalyzer::new(),
        };

        Pipeline {
            config: self.config,
            matcher: self.matcher,
            extractor,
            analyzer,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The curation pipeline
pub struct Pipeline {
    config: CurationConfig,
    matcher: Option<Arc<dyn SubjectMatcher>>,
    extractor: MetadataExtractor,
    analyzer: QualityAnalyzer,
}

/// Photos left after deduplication, plus the audit of those dropped
struct DedupOutcome {
    unique: Vec<(usize, ContentFingerprint)>,
    duplicates: Vec<DuplicateEntry>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &CurationConfig {
        &self.config
    }

    /// Scan the input folder and curate it, without events
    pub fn run(&self) -> Result<PipelineResult, CuratorError> {
        self.run_with_events(&null_sender())
    }

    /// Scan the input folder and curate it
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult, CuratorError> {
        self.config.validate()?;
        let input = self.config.input.clone().ok_or(ConfigError::MissingInput)?;

        let start = Instant::now();
        events.send(Event::Pipeline(PipelineEvent::Started));
        self.phase(events, PipelinePhase::Scanning);

        let scanner = WalkDirScanner::new(self.config.scan_config.clone());
        let scan = scanner.scan_with_events(&input, events)?;
        let scan_errors: Vec<ScanProblem> = scan.errors.iter().map(ScanProblem::from).collect();
        for problem in &scan_errors {
            warn!(path = %problem.path.display(), error = %problem.message, "scan problem");
        }

        self.curate(scan.photos, scan_errors, start, events)
    }

    /// Curate an explicit list of photos, in the given order
    pub fn run_on(
        &self,
        photos: Vec<PhotoFile>,
        events: &EventSender,
    ) -> Result<PipelineResult, CuratorError> {
        self.config.validate()?;
        let start = Instant::now();
        events.send(Event::Pipeline(PipelineEvent::Started));
        self.curate(photos, Vec::new(), start, events)
    }

    fn phase(&self, events: &EventSender, phase: PipelinePhase) {
        debug!(phase = %phase, "pipeline phase");
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
    }

    fn worker_pool(&self) -> Result<ThreadPool, ConfigError> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_count())
            .thread_name(|i| format!("curate-worker-{i}"))
            .build()
            .map_err(|e| ConfigError::WorkerPool(e.to_string()))
    }

    fn subject_matcher(&self) -> Result<Option<Arc<dyn SubjectMatcher>>, ConfigError> {
        if self.config.mode == CurationMode::CopyAll {
            return Ok(None);
        }
        if let Some(matcher) = &self.matcher {
            return Ok(Some(Arc::clone(matcher)));
        }
        match &self.config.reference_dir {
            Some(dir) => {
                let matcher = ReferenceImageMatcher::from_dir(dir, self.config.match_threshold)?;
                Ok(Some(Arc::new(matcher)))
            }
            None => Ok(None),
        }
    }

    fn curate(
        &self,
        photos: Vec<PhotoFile>,
        scan_errors: Vec<ScanProblem>,
        start: Instant,
        events: &EventSender,
    ) -> Result<PipelineResult, CuratorError> {
        let pool = self.worker_pool()?;
        let matcher = self.subject_matcher()?;
        info!(
            photos = photos.len(),
            workers = pool.current_num_threads(),
            mode = ?self.config.mode,
            "curation started"
        );

        self.phase(events, PipelinePhase::Fingerprinting);
        let dedup = pool.install(|| self.deduplicate(&photos, events));

        self.phase(events, PipelinePhase::Analyzing);
        let records =
            pool.install(|| self.analyze(&photos, &dedup.unique, matcher.as_deref(), events));
        let decode_failures = records.iter().filter(|r| !r.quality.decoded).count();
        events.send(Event::Analyze(AnalyzeEvent::Completed {
            unique_photos: records.len(),
            duplicates: dedup.duplicates.len(),
        }));

        self.phase(events, PipelinePhase::Selecting);
        let unique = records.len();
        let grouped = group_by_event(records);
        let event_count = grouped.len();
        events.send(Event::Select(SelectEvent::EventsFormed {
            events: event_count,
        }));
        let selected = self.config.effective_selection().select(grouped);
        events.send(Event::Select(SelectEvent::Completed {
            selected: selected.len(),
        }));
        info!(events = event_count, selected = selected.len(), "selection finished");

        self.phase(events, PipelinePhase::Materializing);
        let plan = plan_copies(&selected, &self.config.output, self.config.layout);
        let outcome: MaterializeOutcome = pool.install(|| {
            Materializer::execute(&plan, &self.config.output, self.config.dry_run, events)
        })?;

        self.phase(events, PipelinePhase::Reporting);
        let summary = RunSummary {
            scanned: photos.len(),
            unique,
            duplicates: dedup.duplicates.len(),
            decode_failures,
            events: event_count,
            selected: selected.len(),
            materialized: outcome.copied.len(),
            failed: outcome.failures.len(),
            duration_ms: 0,
        };
        let mut report = CurationReport::build(&selected, &outcome, dedup.duplicates, summary)
            .with_scan_errors(scan_errors);

        let report_path = write_report(&report, &self.config.output, self.config.report_format)?;
        let (duplicate_audit_path, failure_audit_path) = match self.config.report_format {
            ReportFormat::Csv => (
                Some(write_duplicate_audit(&report, &self.config.output)?),
                Some(write_failure_audit(&report, &self.config.output)?),
            ),
            ReportFormat::Json => (None, None),
        };
        events.send(Event::Materialize(MaterializeEvent::ReportWritten {
            path: report_path.clone(),
        }));

        report.summary.duration_ms = start.elapsed().as_millis() as u64;
        let summary = report.summary.clone();
        info!(
            scanned = summary.scanned,
            duplicates = summary.duplicates,
            materialized = summary.materialized,
            failed = summary.failed,
            duration_ms = summary.duration_ms,
            "curation finished"
        );
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: summary.clone(),
        }));

        Ok(PipelineResult {
            report,
            report_path,
            duplicate_audit_path,
            failure_audit_path,
            selected,
            summary,
        })
    }

    /// Fingerprint every photo in parallel, then keep the lowest scan index
    /// of each digest. Unreadable files are always kept.
    fn deduplicate(&self, photos: &[PhotoFile], events: &EventSender) -> DedupOutcome {
        let registry = FingerprintRegistry::new();

        let fingerprints: Vec<ContentFingerprint> = photos
            .par_iter()
            .enumerate()
            .map(|(index, photo)| {
                let fingerprint = ContentFingerprint::of_file(&photo.path);
                if let Some(digest) = fingerprint.dedup_key() {
                    registry.claim(digest, index);
                }
                fingerprint
            })
            .collect();

        let mut unique = Vec::with_capacity(photos.len());
        let mut duplicates = Vec::new();
        for (index, fingerprint) in fingerprints.into_iter().enumerate() {
            let owner = fingerprint
                .dedup_key()
                .and_then(|digest| registry.owner(digest))
                .unwrap_or(index);

            if owner == index {
                unique.push((index, fingerprint));
            } else {
                let entry = DuplicateEntry {
                    path: photos[index].path.clone(),
                    original: photos[owner].path.clone(),
                };
                debug!(
                    path = %entry.path.display(),
                    original = %entry.original.display(),
                    "skipping duplicate content"
                );
                events.send(Event::Analyze(AnalyzeEvent::DuplicateSkipped {
                    path: entry.path.clone(),
                    original: entry.original.clone(),
                }));
                duplicates.push(entry);
            }
        }

        info!(
            unique = unique.len(),
            duplicates = duplicates.len(),
            "deduplication finished"
        );
        DedupOutcome { unique, duplicates }
    }

    /// Metadata, quality and subject match for each unique photo
    fn analyze(
        &self,
        photos: &[PhotoFile],
        unique: &[(usize, ContentFingerprint)],
        matcher: Option<&dyn SubjectMatcher>,
        events: &EventSender,
    ) -> Vec<ImageRecord> {
        let total = unique.len();
        let completed = AtomicUsize::new(0);
        events.send(Event::Analyze(AnalyzeEvent::Started {
            total_photos: total,
        }));

        unique
            .par_iter()
            .map(|&(index, fingerprint)| {
                let photo = &photos[index];
                let metadata = self.extractor.extract(photo);

                let (quality, subject_match) = match self.config.mode {
                    CurationMode::CopyAll => (QualityScore::skipped(), false),
                    CurationMode::Curate => match FastDecoder::decode(&photo.path) {
                        Ok(image) => (
                            self.analyzer.analyze_image(&image),
                            matcher.is_some_and(|m| m.matches(&image)),
                        ),
                        Err(e) => {
                            warn!(
                                path = %photo.path.display(),
                                error = %e,
                                "could not decode, scoring 0"
                            );
                            events.send(Event::Analyze(AnalyzeEvent::DecodeFailed {
                                path: photo.path.clone(),
                                message: e.to_string(),
                            }));
                            (QualityScore::failed(), false)
                        }
                    },
                };

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                events.send(Event::Analyze(AnalyzeEvent::Progress(AnalyzeProgress {
                    completed: done,
                    total,
                    current_path: photo.path.clone(),
                })));

                ImageRecord::new(
                    photo.path.clone(),
                    index,
                    fingerprint,
                    metadata,
                    quality,
                    subject_match,
                )
            })
            .collect()
    }
}
