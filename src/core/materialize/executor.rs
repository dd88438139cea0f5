//! Copies planned files into the output folder.

use super::types::{CopyFailure, MaterializeOutcome, PlannedCopy};
use crate::error::MaterializeError;
use crate::events::{Event, EventSender, MaterializeEvent};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Executes copy plans
pub struct Materializer;

impl Materializer {
    /// Create `output_root` and copy every planned file in parallel.
    ///
    /// Only a failure to create `output_root` itself is returned as an error.
    /// Individual copy failures are collected in the outcome and the rest of
    /// the batch carries on. With `dry_run` the folder is created but no
    /// photo is copied.
    pub fn execute(
        plan: &[PlannedCopy],
        output_root: &Path,
        dry_run: bool,
        events: &EventSender,
    ) -> Result<MaterializeOutcome, MaterializeError> {
        fs::create_dir_all(output_root).map_err(|source| MaterializeError::CreateDir {
            path: output_root.to_path_buf(),
            source,
        })?;

        events.send(Event::Materialize(MaterializeEvent::Started { total: plan.len() }));

        if dry_run {
            info!(planned = plan.len(), "dry run, nothing copied");
            return Ok(MaterializeOutcome {
                copied: plan.to_vec(),
                failures: Vec::new(),
                dry_run: true,
            });
        }

        let results: Vec<Result<PlannedCopy, CopyFailure>> = plan
            .par_iter()
            .map(|planned| {
                let result = copy_one(planned);
                match &result {
                    Ok(done) => events.send(Event::Materialize(MaterializeEvent::Copied {
                        rank: done.rank,
                        source: done.source.clone(),
                        destination: done.destination.clone(),
                    })),
                    Err(failure) => {
                        warn!(
                            source = %failure.source.display(),
                            error = %failure.message,
                            "copy failed"
                        );
                        events.send(Event::Materialize(MaterializeEvent::Failed {
                            source: failure.source.clone(),
                            message: failure.message.clone(),
                        }));
                    }
                }
                result
            })
            .collect();

        let mut outcome = MaterializeOutcome::default();
        for result in results {
            match result {
                Ok(copied) => outcome.copied.push(copied),
                Err(failure) => outcome.failures.push(failure),
            }
        }

        info!(
            copied = outcome.copied.len(),
            failed = outcome.failures.len(),
            "materialization finished"
        );
        Ok(outcome)
    }
}

fn copy_one(planned: &PlannedCopy) -> Result<PlannedCopy, CopyFailure> {
    let fail = |error: MaterializeError| CopyFailure {
        rank: planned.rank,
        source: planned.source.clone(),
        destination: planned.destination.clone(),
        message: error.to_string(),
    };

    if let Some(parent) = planned.destination.parent() {
        fs::create_dir_all(parent).map_err(|source| {
            fail(MaterializeError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })
        })?;
    }

    fs::copy(&planned.source, &planned.destination).map_err(|source| {
        fail(MaterializeError::Copy {
            source_path: planned.source.clone(),
            destination: planned.destination.clone(),
            source,
        })
    })?;
    preserve_mtime(&planned.source, &planned.destination);

    Ok(planned.clone())
}

/// Carry the source's modification time over to the copy
fn preserve_mtime(source: &Path, destination: &Path) {
    let Ok(modified) = fs::metadata(source).and_then(|m| m.modified()) else {
        return;
    };
    let mtime = filetime::FileTime::from_system_time(modified);
    if let Err(e) = filetime::set_file_mtime(destination, mtime) {
        debug!(path = %destination.display(), error = %e, "could not keep modification time");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::null_sender;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn planned(rank: usize, source: PathBuf, destination: PathBuf) -> PlannedCopy {
        PlannedCopy {
            rank,
            source,
            destination,
        }
    }

    #[test]
    fn copies_and_creates_output_folder() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let output_root = out.path().join("curated");
        let source = src.path().join("a.jpg");
        fs::write(&source, b"pixels").unwrap();

        let plan = vec![planned(1, source.clone(), output_root.join("2024-06/a_1.jpg"))];
        let outcome = Materializer::execute(&plan, &output_root, false, &null_sender()).unwrap();

        assert_eq!(outcome.copied.len(), 1);
        assert!(outcome.failures.is_empty());
        assert_eq!(fs::read(output_root.join("2024-06/a_1.jpg")).unwrap(), b"pixels");
        assert!(source.exists());
    }

    #[test]
    fn one_failure_does_not_stop_the_batch() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let good = src.path().join("good.jpg");
        fs::write(&good, b"ok").unwrap();

        let plan = vec![
            planned(1, src.path().join("vanished.jpg"), out.path().join("x_1.jpg")),
            planned(2, good, out.path().join("x_2.jpg")),
        ];
        let outcome = Materializer::execute(&plan, out.path(), false, &null_sender()).unwrap();

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].rank, 1);
        assert!(outcome.failures[0].message.contains("vanished.jpg"));
        assert_eq!(outcome.copied.len(), 1);
        assert!(out.path().join("x_2.jpg").exists());
    }

    #[test]
    fn copy_keeps_source_modification_time() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let source = src.path().join("old.jpg");
        fs::write(&source, b"pixels").unwrap();
        let taken = filetime::FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_mtime(&source, taken).unwrap();

        let destination = out.path().join("old_1.jpg");
        let plan = vec![planned(1, source, destination.clone())];
        Materializer::execute(&plan, out.path(), false, &null_sender()).unwrap();

        let copied = fs::metadata(&destination).unwrap();
        assert_eq!(filetime::FileTime::from_last_modification_time(&copied), taken);
    }

    #[test]
    fn dry_run_copies_nothing() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let source = src.path().join("a.jpg");
        fs::write(&source, b"pixels").unwrap();

        let plan = vec![planned(1, source, out.path().join("a_1.jpg"))];
        let outcome = Materializer::execute(&plan, out.path(), true, &null_sender()).unwrap();

        assert!(outcome.dry_run);
        assert_eq!(outcome.copied, plan);
        assert!(!out.path().join("a_1.jpg").exists());
    }
}
