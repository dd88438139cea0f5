//! Ordering used by every ranking step.

use std::cmp::Ordering;

/// Added to a subject-matched photo's score in reports, mirroring the
/// "matched photos always come first" tier of [`RankKey`]
pub const SUBJECT_PRIORITY_BONUS: f64 = 1000.0;

/// Sort key for a candidate photo.
///
/// Compares best-first, so ascending order is rank order:
/// 1. subject match before no match
/// 2. higher score before lower
/// 3. decoded before undecodable
/// 4. lower scan index before higher
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankKey {
    pub subject_match: bool,
    pub score: f64,
    pub decoded: bool,
    pub scan_index: usize,
}

impl RankKey {
    /// Score as shown in reports
    pub fn combined_score(&self) -> f64 {
        combined_score(self.score, self.subject_match)
    }
}

/// `score`, plus [`SUBJECT_PRIORITY_BONUS`] when the subject matched
pub fn combined_score(score: f64, subject_match: bool) -> f64 {
    if subject_match {
        score + SUBJECT_PRIORITY_BONUS
    } else {
        score
    }
}

impl Eq for RankKey {}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .subject_match
            .cmp(&self.subject_match)
            .then_with(|| other.score.total_cmp(&self.score))
            .then_with(|| other.decoded.cmp(&self.decoded))
            .then_with(|| self.scan_index.cmp(&other.scan_index))
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
