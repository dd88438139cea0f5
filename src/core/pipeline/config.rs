//! Run configuration and its validation.

use crate::core::materialize::OutputLayout;
use crate::core::reporter::ReportFormat;
use crate::core::scanner::ScanConfig;
use crate::core::selection::SelectionPolicy;
use crate::core::subject::DEFAULT_MATCH_THRESHOLD;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What the run does with the unique photos it finds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CurationMode {
    /// Score, rank and keep the best photos
    #[default]
    Curate,
    /// Keep every unique photo in scan order, without scoring
    CopyAll,
}

/// Everything a curation run needs to know
#[derive(Debug, Clone)]
pub struct CurationConfig {
    /// Folder to scan; not needed when photos are passed in directly
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub selection: SelectionPolicy,
    pub mode: CurationMode,
    /// Photos of the subject to prioritize
    pub reference_dir: Option<PathBuf>,
    pub match_threshold: u32,
    /// Worker threads; `None` uses the available parallelism
    pub concurrency: Option<usize>,
    pub layout: OutputLayout,
    pub report_format: ReportFormat,
    pub scan_config: ScanConfig,
    /// Longest side used for quality analysis; `None` is full resolution
    pub analysis_size: Option<u32>,
    pub dry_run: bool,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: PathBuf::from("curated"),
            selection: SelectionPolicy::default(),
            mode: CurationMode::default(),
            reference_dir: None,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            concurrency: None,
            layout: OutputLayout::default(),
            report_format: ReportFormat::default(),
            scan_config: ScanConfig::default(),
            analysis_size: None,
            dry_run: false,
        }
    }
}

impl CurationConfig {
    /// Check the settings before any file is read or written
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(value) = self.selection.per_event_limit.filter(|&v| v == 0) {
            return Err(ConfigError::InvalidPerEventLimit { value });
        }
        if let Some(value) = self.selection.global_limit.filter(|&v| v == 0) {
            return Err(ConfigError::InvalidGlobalLimit { value });
        }
        if let Some(value) = self.concurrency.filter(|&v| v == 0) {
            return Err(ConfigError::InvalidConcurrency { value });
        }

        if let Some(input) = &self.input {
            if !input.is_dir() {
                return Err(ConfigError::InputNotFound {
                    path: input.clone(),
                });
            }
            let input_abs = normalize(input);
            if normalize(&self.output).starts_with(&input_abs) {
                return Err(ConfigError::OutputInsideInput {
                    input: input.clone(),
                    output: self.output.clone(),
                });
            }
        }

        if let Some(reference) = &self.reference_dir {
            if !reference.is_dir() {
                return Err(ConfigError::ReferenceNotFound {
                    path: reference.clone(),
                });
            }
        }

        Ok(())
    }

    /// Worker count after applying the default
    pub fn worker_count(&self) -> usize {
        self.concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Selection actually applied for the configured mode
    pub fn effective_selection(&self) -> SelectionPolicy {
        match self.mode {
            CurationMode::Curate => self.selection,
            CurationMode::CopyAll => SelectionPolicy::unlimited(),
        }
    }
}

/// Absolute form of `path`, resolving symlinks where the path exists.
/// A missing output folder is resolved through its nearest existing ancestor.
fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            normalize(parent).join(name)
        }
        _ => std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf()),
    }
}
