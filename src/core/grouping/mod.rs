//! # Grouping Module
//!
//! Partitions records into events: all photos sharing a capture date.

use crate::core::record::ImageRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Photos taken on the same calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub date: NaiveDate,
    /// In scan order
    pub records: Vec<ImageRecord>,
}

impl Event {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Group records by capture date. Events come out oldest first and each
/// event keeps its records in scan order, whatever the input order.
pub fn group_by_event(records: Vec<ImageRecord>) -> Vec<Event> {
    let mut by_date: BTreeMap<NaiveDate, Vec<ImageRecord>> = BTreeMap::new();
    for record in records {
        by_date.entry(record.capture_date).or_default().push(record);
    }

    by_date
        .into_iter()
        .map(|(date, mut records)| {
            records.sort_by_key(|r| r.scan_index);
            Event { date, records }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::test_support::record;

    #[test]
    fn empty_input_gives_no_events() {
        assert!(group_by_event(Vec::new()).is_empty());
    }

    #[test]
    fn events_are_sorted_by_date() {
        let events = group_by_event(vec![
            record(0, (2024, 6, 2), 1.0),
            record(1, (2023, 1, 1), 1.0),
            record(2, (2024, 6, 2), 1.0),
        ]);

        let dates: Vec<_> = events.iter().map(|e| e.date.to_string()).collect();
        assert_eq!(dates, vec!["2023-01-01", "2024-06-02"]);
        assert_eq!(events[1].len(), 2);
    }

    #[test]
    fn records_within_an_event_follow_scan_order() {
        let events = group_by_event(vec![
            record(7, (2024, 6, 1), 1.0),
            record(2, (2024, 6, 1), 9.0),
            record(5, (2024, 6, 1), 5.0),
        ]);

        let order: Vec<_> = events[0].records.iter().map(|r| r.scan_index).collect();
        assert_eq!(order, vec![2, 5, 7]);
    }
}
