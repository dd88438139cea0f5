//! Types for the materialize module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How selected photos are arranged under the output folder
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    /// Every photo directly in the output folder
    #[default]
    Flat,
    /// `YYYY-MM/YYYY-MM-DD/` subfolders by capture date
    Nested,
}

/// One copy decided before any bytes move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedCopy {
    pub rank: usize,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// A planned copy that did not happen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyFailure {
    pub rank: usize,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub message: String,
}

/// What came of a plan, both lists in rank order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializeOutcome {
    pub copied: Vec<PlannedCopy>,
    pub failures: Vec<CopyFailure>,
    /// `true` when nothing was actually written
    pub dry_run: bool,
}
