//! # Selection Module
//!
//! Two-tier ranked selection:
//!
//! 1. **Per event**: each event keeps its best `per_event_limit` photos.
//! 2. **Global**: the survivors are pooled, ranked again, and cut to
//!    `global_limit`.
//!
//! Both tiers sort by [`RankKey`](crate::core::quality::RankKey), so
//! selection is a pure ranking: nothing selected ever ranks below something
//! excluded from the same pool. Either limit can be switched off with `None`.

use crate::core::grouping::Event;
use crate::core::record::ImageRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_PER_EVENT_LIMIT: usize = 5;
pub const DEFAULT_GLOBAL_LIMIT: usize = 150;

/// How many photos survive each tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    pub per_event_limit: Option<usize>,
    pub global_limit: Option<usize>,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            per_event_limit: Some(DEFAULT_PER_EVENT_LIMIT),
            global_limit: Some(DEFAULT_GLOBAL_LIMIT),
        }
    }
}

impl SelectionPolicy {
    /// Keep everything; ranks follow the key alone
    pub fn unlimited() -> Self {
        Self {
            per_event_limit: None,
            global_limit: None,
        }
    }

    /// Run both tiers over grouped events
    pub fn select(&self, events: Vec<Event>) -> Vec<SelectedImage> {
        let mut pool = Vec::new();
        for event in events {
            let kept = self.select_in_event(event.records);
            debug!(date = %event.date, kept = kept.len(), "event ranked");
            pool.extend(kept);
        }

        sort_by_rank(&mut pool);
        if let Some(limit) = self.global_limit {
            pool.truncate(limit);
        }

        pool.into_iter()
            .enumerate()
            .map(|(i, record)| SelectedImage {
                rank: i + 1,
                record,
            })
            .collect()
    }

    /// Tier one for a single event
    pub fn select_in_event(&self, mut records: Vec<ImageRecord>) -> Vec<ImageRecord> {
        sort_by_rank(&mut records);
        if let Some(limit) = self.per_event_limit {
            records.truncate(limit);
        }
        records
    }
}

fn sort_by_rank(records: &mut [ImageRecord]) {
    records.sort_by_key(|r| r.rank_key());
}

/// A chosen photo and its 1-based position in the final ranking
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedImage {
    pub rank: usize,
    pub record: ImageRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grouping::group_by_event;
    use crate::core::record::test_support::record;

    fn scores(selected: &[SelectedImage]) -> Vec<f64> {
        selected.iter().map(|s| s.record.quality.score).collect()
    }

    fn policy(per_event: Option<usize>, global: Option<usize>) -> SelectionPolicy {
        SelectionPolicy {
            per_event_limit: per_event,
            global_limit: global,
        }
    }

    #[test]
    fn defaults_are_five_and_one_fifty() {
        let p = SelectionPolicy::default();
        assert_eq!(p.per_event_limit, Some(5));
        assert_eq!(p.global_limit, Some(150));
    }

    #[test]
    fn per_event_limit_keeps_best() {
        let events = group_by_event(vec![
            record(0, (2024, 6, 1), 10.0),
            record(1, (2024, 6, 1), 90.0),
            record(2, (2024, 6, 1), 50.0),
        ]);

        let selected = policy(Some(2), None).select(events);
        assert_eq!(scores(&selected), vec![90.0, 50.0]);
        assert_eq!(selected[0].rank, 1);
        assert_eq!(selected[1].rank, 2);
    }

    #[test]
    fn global_limit_cuts_across_events() {
        let events = group_by_event(vec![
            record(0, (2024, 6, 1), 95.0),
            record(1, (2024, 6, 1), 80.0),
            record(2, (2024, 6, 2), 90.0),
            record(3, (2024, 6, 2), 40.0),
        ]);

        let selected = policy(Some(5), Some(2)).select(events);
        assert_eq!(scores(&selected), vec![95.0, 90.0]);
    }

    #[test]
    fn equal_scores_fall_back_to_scan_order() {
        let events = group_by_event(vec![
            record(4, (2024, 6, 1), 7.0),
            record(1, (2024, 6, 1), 7.0),
            record(9, (2024, 6, 1), 7.0),
        ]);

        let selected = policy(Some(2), None).select(events);
        let order: Vec<_> = selected.iter().map(|s| s.record.scan_index).collect();
        assert_eq!(order, vec![1, 4]);
    }

    #[test]
    fn undecodable_photo_is_chosen_only_when_nothing_else_remains() {
        let mut broken = record(0, (2024, 6, 1), 0.0);
        broken.quality = crate::core::quality::QualityScore::failed();
        let events = group_by_event(vec![broken.clone(), record(1, (2024, 6, 1), 0.0)]);

        let one = policy(Some(1), None).select(events.clone());
        assert_eq!(one[0].record.scan_index, 1);

        let two = policy(Some(2), None).select(events);
        assert_eq!(two[1].record.scan_index, 0);
    }

    #[test]
    fn subject_match_outranks_higher_scores() {
        let mut matched = record(2, (2024, 6, 1), 5.0);
        matched.subject_match = true;
        let events = group_by_event(vec![
            record(0, (2024, 6, 1), 90.0),
            record(1, (2024, 6, 1), 80.0),
            matched,
        ]);

        let selected = policy(Some(1), None).select(events);
        assert_eq!(selected[0].record.scan_index, 2);
    }

    #[test]
    fn nothing_selected_ranks_below_an_excluded_survivor() {
        let records: Vec<_> = (0..20)
            .map(|i| record(i, (2024, 1, 1 + (i % 4) as u32), ((i * 37) % 23) as f64))
            .collect();
        let events = group_by_event(records);

        let p = policy(Some(3), Some(5));
        let survivors: Vec<ImageRecord> = events
            .iter()
            .flat_map(|e| p.select_in_event(e.records.clone()))
            .collect();
        let selected = p.select(events);

        assert_eq!(selected.len(), 5);
        let worst_selected = selected.last().unwrap().record.rank_key();
        for survivor in survivors {
            if !selected.iter().any(|s| s.record.scan_index == survivor.scan_index) {
                assert!(worst_selected < survivor.rank_key());
            }
        }
    }

    #[test]
    fn disabled_limits_keep_everything_ranked() {
        let events = group_by_event(vec![
            record(0, (2024, 6, 1), 1.0),
            record(1, (2024, 6, 2), 3.0),
            record(2, (2024, 6, 2), 2.0),
        ]);

        let selected = SelectionPolicy::unlimited().select(events);
        assert_eq!(scores(&selected), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn empty_input_selects_nothing() {
        assert!(SelectionPolicy::default().select(Vec::new()).is_empty());
    }
}
