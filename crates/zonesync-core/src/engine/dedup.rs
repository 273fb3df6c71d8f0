//! Duplicate resolution
//!
//! Splits the matching record sets of a target into one survivor ("kept")
//! and the extras to delete. Pure: no provider access.

use crate::config::SurvivorStrategy;
use crate::traits::RecordSet;

/// Survivor and extras among the matching record sets
///
/// `extras` never contains `kept`. An empty match set yields no survivor and
/// no extras, which means the record set has to be created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub kept: Option<RecordSet>,
    pub extras: Vec<RecordSet>,
}

impl DuplicateGroup {
    /// Pick the survivor according to `strategy`
    ///
    /// Extras keep provider order whatever the strategy.
    pub fn resolve(mut matching: Vec<RecordSet>, strategy: SurvivorStrategy) -> Self {
        if matching.is_empty() {
            return Self::default();
        }

        let kept_index = survivor_index(&matching, strategy);
        let kept = matching.remove(kept_index);

        Self {
            kept: Some(kept),
            extras: matching,
        }
    }

    /// Whether nothing matched
    pub fn is_empty(&self) -> bool {
        self.kept.is_none()
    }

    /// Whether any extra has to be deleted
    pub fn has_duplicates(&self) -> bool {
        !self.extras.is_empty()
    }

    /// Ids of the extras, in deletion order
    pub fn extra_ids(&self) -> Vec<String> {
        self.extras.iter().map(|r| r.id.clone()).collect()
    }
}

fn survivor_index(matching: &[RecordSet], strategy: SurvivorStrategy) -> usize {
    // min_by_key returns the first minimum, so ties fall back to provider order
    match strategy {
        SurvivorStrategy::ProviderOrder => 0,
        SurvivorStrategy::LowestId => matching
            .iter()
            .enumerate()
            .min_by_key(|(_, record)| record.id.as_str())
            .map(|(index, _)| index)
            .unwrap_or(0),
        SurvivorStrategy::Oldest => matching
            .iter()
            .enumerate()
            .min_by_key(|(_, record)| (record.created_at.is_none(), record.created_at))
            .map(|(index, _)| index)
            .unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, created: Option<i64>) -> RecordSet {
        RecordSet {
            id: id.to_string(),
            name: "www.example.com.".to_string(),
            record_type: "A".to_string(),
            line: Some("default".to_string()),
            ttl: Some(300),
            values: vec![],
            created_at: created.and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        }
    }

    fn ids(records: &[RecordSet]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_group() {
        let group = DuplicateGroup::resolve(vec![], SurvivorStrategy::ProviderOrder);
        assert!(group.is_empty());
        assert!(!group.has_duplicates());
        assert!(group.extras.is_empty());
    }

    #[test]
    fn test_single_match_has_no_extras() {
        let group = DuplicateGroup::resolve(vec![record("only", None)], SurvivorStrategy::ProviderOrder);
        assert_eq!(group.kept.unwrap().id, "only");
        assert!(group.extras.is_empty());
    }

    #[test]
    fn test_provider_order_keeps_first() {
        let group = DuplicateGroup::resolve(
            vec![record("z", None), record("a", None), record("m", None)],
            SurvivorStrategy::ProviderOrder,
        );
        assert_eq!(group.kept.as_ref().unwrap().id, "z");
        assert_eq!(ids(&group.extras), vec!["a", "m"]);
        assert_eq!(group.extra_ids(), vec!["a".to_string(), "m".to_string()]);
    }

    #[test]
    fn test_lowest_id_keeps_smallest_and_extras_keep_order() {
        let group = DuplicateGroup::resolve(
            vec![record("z", None), record("a", None), record("m", None)],
            SurvivorStrategy::LowestId,
        );
        assert_eq!(group.kept.unwrap().id, "a");
        assert_eq!(ids(&group.extras), vec!["z", "m"]);
    }

    #[test]
    fn test_oldest_prefers_timestamped_records() {
        let group = DuplicateGroup::resolve(
            vec![record("none", None), record("new", Some(2_000)), record("old", Some(1_000))],
            SurvivorStrategy::Oldest,
        );
        assert_eq!(group.kept.unwrap().id, "old");
        assert_eq!(ids(&group.extras), vec!["none", "new"]);
    }

    #[test]
    fn test_oldest_without_timestamps_falls_back_to_provider_order() {
        let group = DuplicateGroup::resolve(
            vec![record("b", None), record("a", None)],
            SurvivorStrategy::Oldest,
        );
        assert_eq!(group.kept.unwrap().id, "b");
    }
}
