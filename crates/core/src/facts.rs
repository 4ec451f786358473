//! Leaf-level usage facts
//!
//! Sparse `(datum, mission) -> used` table. Pairs never recorded read as
//! unused.

use crate::types::{DatumId, MissionId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which missions directly use which operational data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageFacts {
    facts: BTreeMap<DatumId, BTreeMap<MissionId, bool>>,
}

impl UsageFacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an explicit fact for a pair, replacing any earlier one
    pub fn record(&mut self, datum: impl Into<DatumId>, mission: impl Into<MissionId>, used: bool) {
        self.facts
            .entry(datum.into())
            .or_default()
            .insert(mission.into(), used);
    }

    /// Record that a mission directly uses a datum
    pub fn mark_used(&mut self, datum: impl Into<DatumId>, mission: impl Into<MissionId>) {
        self.record(datum, mission, true);
    }

    /// Chaining form of [`UsageFacts::mark_used`]
    pub fn with_use(mut self, datum: impl Into<DatumId>, mission: impl Into<MissionId>) -> Self {
        self.mark_used(datum, mission);
        self
    }

    pub fn is_used(&self, datum: &DatumId, mission: &MissionId) -> bool {
        self.facts
            .get(datum)
            .and_then(|missions| missions.get(mission))
            .copied()
            .unwrap_or(false)
    }

    /// Missions recorded as using a datum
    pub fn missions_using<'a>(&'a self, datum: &DatumId) -> impl Iterator<Item = &'a MissionId> + 'a {
        self.facts
            .get(datum)
            .into_iter()
            .flat_map(|missions| missions.iter())
            .filter(|(_, &used)| used)
            .map(|(mission, _)| mission)
    }

    /// Every `(datum, mission)` pair recorded as used
    pub fn used_pairs(&self) -> impl Iterator<Item = (&DatumId, &MissionId)> {
        self.facts.iter().flat_map(|(datum, missions)| {
            missions
                .iter()
                .filter(|(_, &used)| used)
                .map(move |(mission, _)| (datum, mission))
        })
    }

    /// Data that appear in at least one fact
    pub fn data(&self) -> BTreeSet<&DatumId> {
        self.facts.keys().collect()
    }

    /// Number of recorded facts, used or not
    pub fn len(&self) -> usize {
        self.facts.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fact_reads_as_unused() {
        let facts = UsageFacts::new();
        assert!(!facts.is_used(&"d".into(), &"m".into()));
        assert!(facts.is_empty());
    }

    #[test]
    fn test_explicit_zero_overrides_earlier_use() {
        let mut facts = UsageFacts::new();
        facts.mark_used("d", "m");
        facts.record("d", "m", false);

        assert!(!facts.is_used(&"d".into(), &"m".into()));
        assert_eq!(facts.len(), 1);
        assert_eq!(facts.used_pairs().count(), 0);
    }

    #[test]
    fn test_missions_using_skips_explicit_zeroes() {
        let mut facts = UsageFacts::new().with_use("d", "m1").with_use("d", "m2");
        facts.record("d", "m3", false);

        let missions: Vec<&str> = facts
            .missions_using(&"d".into())
            .map(MissionId::as_str)
            .collect();
        assert_eq!(missions, vec!["m1", "m2"]);
    }

    #[test]
    fn test_data_includes_unused_entries() {
        let mut facts = UsageFacts::new().with_use("d2", "m1");
        facts.record("d1", "m1", false);

        let data: Vec<&str> = facts.data().into_iter().map(DatumId::as_str).collect();
        assert_eq!(data, vec!["d1", "d2"]);
    }
}
