//! Score tables keyed by `(datum, mission)`.

use crate::types::{DatumId, MissionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key of one score
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScoreKey {
    pub datum: DatumId,
    pub mission: MissionId,
}

impl ScoreKey {
    pub fn new(datum: impl Into<DatumId>, mission: impl Into<MissionId>) -> Self {
        Self {
            datum: datum.into(),
            mission: mission.into(),
        }
    }
}

/// Flat, serializable form of one score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub datum: DatumId,
    pub mission: MissionId,
    pub score: f64,
}

/// Immutable-after-construction collection of scores
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreTable {
    scores: BTreeMap<ScoreKey, f64>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ScoreKey, score: f64) {
        self.scores.insert(key, score);
    }

    pub fn get(&self, datum: &DatumId, mission: &MissionId) -> Option<f64> {
        // BTreeMap lookups need an owned key.
        self.scores
            .get(&ScoreKey {
                datum: datum.clone(),
                mission: mission.clone(),
            })
            .copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Scores ordered by datum, then mission
    pub fn iter(&self) -> impl Iterator<Item = (&ScoreKey, f64)> {
        self.scores.iter().map(|(key, &score)| (key, score))
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.scores.values().copied()
    }

    /// Smallest and largest score, `None` when empty
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.values().fold(None, |acc, score| match acc {
            None => Some((score, score)),
            Some((min, max)) => Some((min.min(score), max.max(score))),
        })
    }

    pub fn entries(&self) -> Vec<ScoreEntry> {
        self.iter()
            .map(|(key, score)| ScoreEntry {
                datum: key.datum.clone(),
                mission: key.mission.clone(),
                score,
            })
            .collect()
    }
}

impl FromIterator<(ScoreKey, f64)> for ScoreTable {
    fn from_iter<I: IntoIterator<Item = (ScoreKey, f64)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

impl Extend<(ScoreKey, f64)> for ScoreTable {
    fn extend<I: IntoIterator<Item = (ScoreKey, f64)>>(&mut self, iter: I) {
        self.scores.extend(iter);
    }
}
