//! Report serialization and persistence.
//!
//! Files are written to a temporary file in the destination folder and
//! renamed into place, so an interrupted run leaves either the previous
//! report or the new one, never half of one.

use super::{CurationReport, ReportFormat, ReportRow};
use crate::error::ReportError;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Audit of skipped duplicates, written next to a CSV report
pub const DUPLICATES_FILE_NAME: &str = "curated_photos_duplicates.csv";

/// Audit of failed copies and unreadable input, written next to a CSV report
pub const FAILURES_FILE_NAME: &str = "curated_photos_failures.csv";

/// Quote a CSV field when it contains a comma, quote or line break
pub fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_csv_line<W: Write, S: AsRef<str>>(writer: &mut W, fields: &[S]) -> std::io::Result<()> {
    let line: Vec<String> = fields.iter().map(|f| csv_escape(f.as_ref())).collect();
    writeln!(writer, "{}", line.join(","))
}

/// One header line, then one line per copied photo in rank order
pub fn export_csv<W: Write>(report: &CurationReport, mut writer: W) -> std::io::Result<()> {
    write_csv_line(&mut writer, &ReportRow::FIELDS)?;
    for row in &report.rows {
        write_csv_line(&mut writer, &row.values())?;
    }
    writer.flush()
}

/// `path,duplicate_of` for every skipped duplicate
pub fn export_duplicates_csv<W: Write>(
    report: &CurationReport,
    mut writer: W,
) -> std::io::Result<()> {
    write_csv_line(&mut writer, &["path", "duplicate_of"])?;
    for dup in &report.duplicates {
        write_csv_line(
            &mut writer,
            &[
                dup.path.display().to_string(),
                dup.original.display().to_string(),
            ],
        )?;
    }
    writer.flush()
}

/// `kind,rank,path,destination,message`: one `copy` line per failed copy,
/// then one `scan` line per unreadable file or folder
pub fn export_failures_csv<W: Write>(
    report: &CurationReport,
    mut writer: W,
) -> std::io::Result<()> {
    write_csv_line(&mut writer, &["kind", "rank", "path", "destination", "message"])?;
    for failure in &report.failures {
        write_csv_line(
            &mut writer,
            &[
                "copy".to_string(),
                failure.rank.to_string(),
                failure.source.display().to_string(),
                failure.destination.display().to_string(),
                failure.message.clone(),
            ],
        )?;
    }
    for problem in &report.scan_errors {
        write_csv_line(
            &mut writer,
            &[
                "scan".to_string(),
                String::new(),
                problem.path.display().to_string(),
                String::new(),
                problem.message.clone(),
            ],
        )?;
    }
    writer.flush()
}

/// The whole report, pretty-printed
pub fn export_json<W: Write>(report: &CurationReport, mut writer: W) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| ReportError::Serialize(e.to_string()))?;
    writeln!(writer).map_err(|e| ReportError::Serialize(e.to_string()))
}

fn write_atomically<F>(path: &Path, write: F) -> Result<(), ReportError>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<(), ReportError>,
{
    let io_error = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir).map_err(io_error)?;
    {
        let mut writer = BufWriter::new(&mut temp);
        write(&mut writer)?;
        writer.flush().map_err(io_error)?;
    }
    temp.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}

/// Write the report into `output_dir` under its standard file name
pub fn write_report(
    report: &CurationReport,
    output_dir: &Path,
    format: ReportFormat,
) -> Result<PathBuf, ReportError> {
    let path = output_dir.join(format.file_name());
    write_atomically(&path, |writer| match format {
        ReportFormat::Csv => export_csv(report, writer).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        }),
        ReportFormat::Json => export_json(report, writer),
    })?;

    info!(path = %path.display(), rows = report.rows.len(), "report written");
    Ok(path)
}

/// Write [`DUPLICATES_FILE_NAME`] into `output_dir`
pub fn write_duplicate_audit(
    report: &CurationReport,
    output_dir: &Path,
) -> Result<PathBuf, ReportError> {
    let path = output_dir.join(DUPLICATES_FILE_NAME);
    write_atomically(&path, |writer| {
        export_duplicates_csv(report, writer).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })
    })?;
    Ok(path)
}

/// Write [`FAILURES_FILE_NAME`] into `output_dir`
pub fn write_failure_audit(
    report: &CurationReport,
    output_dir: &Path,
) -> Result<PathBuf, ReportError> {
    let path = output_dir.join(FAILURES_FILE_NAME);
    write_atomically(&path, |writer| {
        export_failures_csv(report, writer).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })
    })?;
    if !report.failures.is_empty() || !report.scan_errors.is_empty() {
        info!(
            path = %path.display(),
            copies = report.failures.len(),
            scan = report.scan_errors.len(),
            "failures recorded"
        );
    }
    Ok(path)
}
