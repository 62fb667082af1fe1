//! Grouping of operation records by originating transaction.
//!
//! A single governance action shows up as several records (the external call
//! plus every internal call it spawned), all carrying the same `counter`.

use std::collections::{BTreeSet, HashMap};

use dwatch_sdk::objects::OperationRecord;

/// All records that share one counter, in fetch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationGroup {
    counter: i64,
    records: Vec<OperationRecord>,
}

impl OperationGroup {
    pub fn counter(&self) -> i64 {
        self.counter
    }

    pub fn records(&self) -> &[OperationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct entrypoint names present in the group.
    pub fn entrypoints(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.entrypoint.as_str()).collect()
    }

    /// First record calling `entrypoint`.
    pub fn find(&self, entrypoint: &str) -> Option<&OperationRecord> {
        self.records.iter().find(|r| r.entrypoint == entrypoint)
    }

    /// Earliest parseable record timestamp, in milliseconds.
    pub fn earliest_timestamp_millis(&self) -> Option<i64> {
        self.records
            .iter()
            .filter_map(|r| r.timestamp_millis().ok())
            .min()
    }
}

/// Partition `records` into groups keyed by counter.
///
/// Groups come back in order of each counter's first appearance and records
/// keep their relative fetch order. Nothing is dropped or duplicated.
pub fn group_by_counter(records: impl IntoIterator<Item = OperationRecord>) -> Vec<OperationGroup> {
    let mut groups: Vec<OperationGroup> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for record in records {
        match index.get(&record.counter) {
            Some(&i) => groups[i].records.push(record),
            None => {
                index.insert(record.counter, groups.len());
                groups.push(OperationGroup {
                    counter: record.counter,
                    records: vec![record],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(counter: i64, entrypoint: &str) -> OperationRecord {
        OperationRecord {
            counter,
            entrypoint: entrypoint.to_string(),
            source: "tz1source".to_string(),
            destination: "KT1destination".to_string(),
            timestamp: "2021-09-08T15:37:24Z".to_string(),
            hash: format!("op{counter}"),
            parameters: Vec::new(),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_counter(Vec::new()).is_empty());
    }

    #[test]
    fn test_groups_share_counter_and_keep_order() {
        let input = vec![
            record(5, "voteCallback"),
            record(4, "endVoting"),
            record(5, "vote"),
            record(6, "propose"),
            record(4, "transfer"),
            record(6, "transfer"),
        ];

        let groups = group_by_counter(input.clone());

        let counters: Vec<i64> = groups.iter().map(OperationGroup::counter).collect();
        assert_eq!(counters, vec![5, 4, 6]);

        for group in &groups {
            assert!(group.records().iter().all(|r| r.counter == group.counter()));
        }

        let five: Vec<&str> = groups[0]
            .records()
            .iter()
            .map(|r| r.entrypoint.as_str())
            .collect();
        assert_eq!(five, vec!["voteCallback", "vote"]);

        // union of groups is exactly the input
        let total: usize = groups.iter().map(OperationGroup::len).sum();
        assert_eq!(total, input.len());
        for r in &input {
            let hits = groups
                .iter()
                .flat_map(|g| g.records())
                .filter(|g| *g == r)
                .count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn test_group_lookup_helpers() {
        let mut late = record(9, "vote");
        late.timestamp = "2021-09-08T15:40:00Z".to_string();
        let groups = group_by_counter(vec![late, record(9, "voteCallback"), record(9, "vote")]);
        let group = &groups[0];

        assert_eq!(group.entrypoints().into_iter().collect::<Vec<_>>(), vec!["vote", "voteCallback"]);
        assert_eq!(group.find("vote").unwrap().timestamp, "2021-09-08T15:40:00Z");
        assert!(group.find("propose").is_none());
        assert_eq!(group.earliest_timestamp_millis(), Some(1_631_115_444_000));
    }
}
