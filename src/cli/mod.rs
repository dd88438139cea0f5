//! # CLI Module
//!
//! Command-line interface for the photo curator.
//!
//! ## Usage
//! ```bash
//! # Keep the best 5 photos per day, 150 overall
//! photo-curate curate ~/Dump ~/Curated
//!
//! # Prioritize photos that look like the ones in ~/Me
//! photo-curate curate ~/Dump ~/Curated --reference-dir ~/Me
//!
//! # Copy every unique photo, sorted into month/day folders
//! photo-curate curate ~/Dump ~/Everything --all --layout nested
//!
//! # Explain how a single photo would be scored
//! photo-curate inspect ~/Dump/IMG_0042.JPG
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_curator::core::decode::FastDecoder;
use photo_curator::core::fingerprint::ContentFingerprint;
use photo_curator::core::materialize::OutputLayout;
use photo_curator::core::metadata::MetadataExtractor;
use photo_curator::core::pipeline::{CurationMode, Pipeline, PipelineResult};
use photo_curator::core::quality::{QualityAnalyzer, QualityScore};
use photo_curator::core::reporter::ReportFormat;
use photo_curator::core::scanner::PhotoFile;
use photo_curator::core::selection::{DEFAULT_GLOBAL_LIMIT, DEFAULT_PER_EVENT_LIMIT};
use photo_curator::core::subject::{
    ReferenceImageMatcher, SubjectMatcher, DEFAULT_MATCH_THRESHOLD,
};
use photo_curator::error::{ReportError, Result};
use photo_curator::events::{AnalyzeEvent, Event, EventChannel, PipelineEvent, ScanEvent};
use std::path::{Path, PathBuf};
use std::thread;

/// Photo Curator - The best few photos of every day, without the duplicates
#[derive(Parser, Debug)]
#[command(name = "photo-curate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pick the best photos from INPUT and copy them to OUTPUT
    Curate {
        /// Folder of photos to curate
        input: PathBuf,

        /// Folder to copy the selection and report into
        output: PathBuf,

        /// Photos kept per capture date
        #[arg(long, default_value_t = DEFAULT_PER_EVENT_LIMIT)]
        per_event: usize,

        /// Photos kept overall
        #[arg(long, default_value_t = DEFAULT_GLOBAL_LIMIT, conflicts_with = "no_global_limit")]
        global_limit: usize,

        /// Keep every per-event winner
        #[arg(long)]
        no_global_limit: bool,

        /// Copy every unique photo without scoring
        #[arg(long)]
        all: bool,

        /// Folder of photos showing the subject to prioritize
        #[arg(long)]
        reference_dir: Option<PathBuf>,

        /// Max hash distance for a subject match (0-64)
        #[arg(long, default_value_t = DEFAULT_MATCH_THRESHOLD)]
        match_threshold: u32,

        /// Worker threads (default: all cores)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Arrangement of the output folder
        #[arg(long, default_value = "flat")]
        layout: Layout,

        /// Report file format
        #[arg(long, default_value = "csv")]
        report: ReportKind,

        /// Downscale to this longest side before scoring
        #[arg(long)]
        analysis_size: Option<u32>,

        /// Console output format
        #[arg(short, long, default_value = "pretty")]
        output_format: OutputFormat,

        /// Skip dot-files and dot-directories
        #[arg(long)]
        skip_hidden: bool,

        /// Plan and write the report without copying photos
        #[arg(long)]
        dry_run: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show how a single photo is dated, located and scored
    Inspect {
        /// Photo to inspect
        file: PathBuf,

        /// Folder of photos showing the subject to prioritize
        #[arg(long)]
        reference_dir: Option<PathBuf>,

        /// Max hash distance for a subject match (0-64)
        #[arg(long, default_value_t = DEFAULT_MATCH_THRESHOLD)]
        match_threshold: u32,

        /// Console output format
        #[arg(short, long, default_value = "pretty")]
        output_format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Layout {
    /// Every photo directly in the output folder
    Flat,
    /// YYYY-MM/YYYY-MM-DD subfolders
    Nested,
}

impl From<Layout> for OutputLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Flat => OutputLayout::Flat,
            Layout::Nested => OutputLayout::Nested,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportKind {
    Csv,
    Json,
}

impl From<ReportKind> for ReportFormat {
    fn from(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Csv => ReportFormat::Csv,
            ReportKind::Json => ReportFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (destination paths only)
    Minimal,
}

struct CurateArgs {
    input: PathBuf,
    output: PathBuf,
    per_event: usize,
    global_limit: Option<usize>,
    mode: CurationMode,
    reference_dir: Option<PathBuf>,
    match_threshold: u32,
    jobs: Option<usize>,
    layout: OutputLayout,
    report: ReportFormat,
    analysis_size: Option<u32>,
    output_format: OutputFormat,
    skip_hidden: bool,
    dry_run: bool,
    verbose: bool,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Curate {
            input,
            output,
            per_event,
            global_limit,
            no_global_limit,
            all,
            reference_dir,
            match_threshold,
            jobs,
            layout,
            report,
            analysis_size,
            output_format,
            skip_hidden,
            dry_run,
            verbose,
        } => run_curate(CurateArgs {
            input,
            output,
            per_event,
            global_limit: (!no_global_limit).then_some(global_limit),
            mode: if all {
                CurationMode::CopyAll
            } else {
                CurationMode::Curate
            },
            reference_dir,
            match_threshold,
            jobs,
            layout: layout.into(),
            report: report.into(),
            analysis_size,
            output_format,
            skip_hidden,
            dry_run,
            verbose,
        }),
        Commands::Inspect {
            file,
            reference_dir,
            match_threshold,
            output_format,
        } => run_inspect(&file, reference_dir.as_deref(), match_threshold, output_format),
    }
}

fn run_curate(args: CurateArgs) -> Result<()> {
    let term = Term::stderr();
    let pretty = matches!(args.output_format, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Photo Curator").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let mut builder = Pipeline::builder()
        .input(&args.input)
        .output(&args.output)
        .per_event_limit(Some(args.per_event))
        .global_limit(args.global_limit)
        .mode(args.mode)
        .match_threshold(args.match_threshold)
        .layout(args.layout)
        .report_format(args.report)
        .analysis_size(args.analysis_size)
        .skip_hidden(args.skip_hidden)
        .dry_run(args.dry_run);
    if let Some(dir) = &args.reference_dir {
        builder = builder.reference_dir(dir);
    }
    if let Some(jobs) = args.jobs {
        builder = builder.concurrency(jobs);
    }
    let pipeline = builder.build();

    let (sender, receiver) = EventChannel::new();

    let progress = if pretty {
        let pb = ProgressBar::new(0);
        let bar_style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(bar_style);
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = args.verbose;

    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress_clone.as_ref() else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Scan(ScanEvent::Completed { total_photos }) => {
                    pb.set_length(total_photos as u64);
                }
                Event::Analyze(AnalyzeEvent::Started { total_photos }) => {
                    pb.set_length(total_photos as u64);
                    pb.set_position(0);
                }
                Event::Analyze(AnalyzeEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Analyze(AnalyzeEvent::DuplicateSkipped { path, original }) if verbose => {
                    pb.println(format!(
                        "  {} {} duplicates {}",
                        style("=").dim(),
                        display_path(&path),
                        display_path(&original)
                    ));
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }
    let result = result?;

    match args.output_format {
        OutputFormat::Pretty => print_pretty_results(&term, &result, args.verbose, args.dry_run),
        OutputFormat::Json => print_json_results(&result)?,
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    Ok(())
}

fn print_pretty_results(term: &Term, result: &PipelineResult, verbose: bool, dry_run: bool) {
    let summary = &result.summary;

    term.write_line("").ok();
    term.write_line(&format!(
        "{} Curation Complete",
        style("✓").green().bold()
    ))
    .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} photos scanned in {:.1}s",
        style(summary.scanned).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicates skipped",
        style(summary.duplicates).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} events, {} photos selected",
        style(summary.events).cyan(),
        style(summary.selected).cyan()
    ))
    .ok();

    let copied_label = if dry_run { "planned (dry run)" } else { "copied" };
    term.write_line(&format!(
        "  {} photos {}",
        style(summary.materialized).green(),
        copied_label
    ))
    .ok();

    if summary.decode_failures > 0 {
        term.write_line(&format!(
            "  {} photos could not be decoded and scored 0",
            style(summary.decode_failures).yellow()
        ))
        .ok();
    }

    if !result.report.failures.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Copy failures:").bold().red()))
            .ok();
        for failure in &result.report.failures {
            term.write_line(&format!(
                "  {} {}: {}",
                style("✗").red(),
                display_path(&failure.source),
                failure.message
            ))
            .ok();
        }
    }

    if verbose && !result.report.rows.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Selection:").bold().underlined()))
            .ok();
        for row in &result.report.rows {
            let marker = if row.subject_match {
                style("★").green().to_string()
            } else {
                style("○").dim().to_string()
            };
            term.write_line(&format!(
                "  {} {:>4} {} {}",
                marker,
                row.rank,
                style(format!("{:.1}", row.quality_score)).yellow(),
                display_path(&row.source_path)
            ))
            .ok();
        }
    }

    for problem in &result.report.scan_errors {
        term.write_line(&format!("  {} {}", style("!").yellow(), problem.message))
            .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "  Report: {}",
        style(display_path(&result.report_path)).cyan()
    ))
    .ok();
    if let Some(audit) = &result.duplicate_audit_path {
        term.write_line(&format!(
            "  Duplicates: {}",
            style(display_path(audit)).dim()
        ))
        .ok();
    }
    if let Some(audit) = &result.failure_audit_path {
        term.write_line(&format!(
            "  Failures: {}",
            style(display_path(audit)).dim()
        ))
        .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("Originals were not modified.").dim()
    ))
    .ok();
}

fn print_json_results(result: &PipelineResult) -> Result<()> {
    let output = serde_json::json!({
        "summary": result.summary,
        "duration_ms": result.summary.duration_ms,
        "report_path": result.report_path,
        "duplicate_audit_path": result.duplicate_audit_path,
        "failure_audit_path": result.failure_audit_path,
        "rows": result.report.rows,
        "duplicates": result.report.duplicates,
        "failures": result.report.failures,
        "scan_errors": result.report.scan_errors,
    });
    print_json(&output)
}

fn print_minimal_results(result: &PipelineResult) {
    for row in &result.report.rows {
        println!("{}", row.destination_path.display());
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| ReportError::Serialize(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn run_inspect(
    file: &Path,
    reference_dir: Option<&Path>,
    match_threshold: u32,
    output_format: OutputFormat,
) -> Result<()> {
    let photo = PhotoFile::from_path(file);
    let fingerprint = ContentFingerprint::of_file(file);
    let metadata = MetadataExtractor::new().extract(&photo);

    let matcher = match reference_dir {
        Some(dir) => Some(ReferenceImageMatcher::from_dir(dir, match_threshold)?),
        None => None,
    };

    let (quality, subject_match, decode_error) = match FastDecoder::decode(file) {
        Ok(image) => (
            QualityAnalyzer::new().analyze_image(&image),
            matcher.as_ref().map(|m| m.matches(&image)),
            None,
        ),
        Err(e) => (QualityScore::failed(), matcher.as_ref().map(|_| false), Some(e.to_string())),
    };

    match output_format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "path": file,
            "fingerprint": fingerprint.to_string(),
            "capture_date": metadata.capture_date,
            "date_source": metadata.date_source,
            "location": metadata.location_label(),
            "quality": quality,
            "subject_match": subject_match,
            "decode_error": decode_error,
        })),
        OutputFormat::Minimal => {
            println!("{}\t{}", metadata.capture_date, quality.score);
            Ok(())
        }
        OutputFormat::Pretty => {
            let term = Term::stdout();
            let signals = &quality.signals;
            let lines = [
                format!("{}", style(display_path(file)).bold()),
                format!("  fingerprint  {}", fingerprint),
                format!(
                    "  date         {} ({})",
                    metadata.capture_date, metadata.date_source
                ),
                format!("  location     {}", metadata.location_label()),
                format!("  sharpness    {:.2}", signals.sharpness),
                format!("  brightness   {:.2}", signals.brightness),
                format!("  contrast     {:.2}", signals.contrast),
                format!("  resolution   {} px", signals.resolution),
                format!("  score        {}", style(format!("{:.3}", quality.score)).yellow()),
            ];
            for line in lines {
                term.write_line(&line).ok();
            }
            if let Some(matched) = subject_match {
                term.write_line(&format!("  subject      {}", matched)).ok();
            }
            if let Some(error) = decode_error {
                term.write_line(&format!("  {} {}", style("undecodable:").red(), error))
                    .ok();
            }
            Ok(())
        }
    }
}

/// Shorten paths under the home directory to `~/...`
fn display_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            return format!("~/{}", rest.display());
        }
    }
    path.display().to_string()
}
