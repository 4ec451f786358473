//! Min-max normalization of score tables.
//!
//! `S = lower + (u - min) / (max - min) * (upper - lower)`, with `min` and
//! `max` taken over the whole group being normalized (the whole batch by
//! default). A group whose scores are all equal has no defined rescaling;
//! [`FlatPolicy`] decides what it becomes.

use crate::score::{ScoreKey, ScoreTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Spread below which a group counts as flat
pub const FLAT_TOLERANCE: f64 = 1e-12;

/// Normalization errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NormalizationError {
    #[error("Normalization undefined: every score equals {value}")]
    UndefinedNormalization { value: f64 },

    #[error("Invalid target range [{lower}, {upper}]")]
    InvalidRange { lower: f64, upper: f64 },

    #[error("Score is not finite: {0}")]
    NonFinite(f64),
}

/// What a flat group (all scores equal) normalizes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlatPolicy {
    /// `upper` when the common value is nonzero, `lower` when it is zero
    #[default]
    AbsoluteValue,
    /// Always `lower`
    Floor,
    /// Midpoint of the target range
    Midpoint,
    /// Leave the raw value untouched
    Raw,
    /// Fail with [`NormalizationError::UndefinedNormalization`]
    Strict,
}

/// Which scores share a min/max
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationScope {
    /// One min/max over the whole batch
    #[default]
    Global,
    /// One min/max per mission
    PerMission,
    /// One min/max per datum
    PerDatum,
}

/// Normalization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub lower: f64,
    pub upper: f64,
    pub flat_policy: FlatPolicy,
    pub scope: NormalizationScope,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: 100.0,
            flat_policy: FlatPolicy::default(),
            scope: NormalizationScope::default(),
        }
    }
}

impl NormalizationConfig {
    /// Range check shared by config validation and the normalizer
    pub fn check_range(&self) -> Result<(), NormalizationError> {
        if !self.lower.is_finite() || !self.upper.is_finite() || self.lower >= self.upper {
            return Err(NormalizationError::InvalidRange {
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(())
    }
}

/// Rescales scores into a bounded range
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizationConfig,
}

impl Normalizer {
    pub fn new(config: NormalizationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizationConfig {
        &self.config
    }

    /// Normalize a score table according to the configured scope
    pub fn normalize(&self, scores: &ScoreTable) -> Result<ScoreTable, NormalizationError> {
        self.config.check_range()?;

        let mut groups: BTreeMap<String, Vec<(&ScoreKey, f64)>> = BTreeMap::new();
        for (key, score) in scores.iter() {
            let group = match self.config.scope {
                NormalizationScope::Global => String::new(),
                NormalizationScope::PerMission => key.mission.to_string(),
                NormalizationScope::PerDatum => key.datum.to_string(),
            };
            groups.entry(group).or_default().push((key, score));
        }

        let mut normalized = ScoreTable::new();
        for (group, members) in groups {
            let values: Vec<f64> = members.iter().map(|(_, score)| *score).collect();
            let rescaled = self.rescale(&values)?;
            debug!(group = %group, members = values.len(), "Normalized score group");
            normalized.extend(
                members
                    .into_iter()
                    .zip(rescaled)
                    .map(|((key, _), score)| (key.clone(), score)),
            );
        }
        Ok(normalized)
    }

    /// Rescale a slice of values against its own min and max
    pub fn rescale(&self, values: &[f64]) -> Result<Vec<f64>, NormalizationError> {
        self.config.check_range()?;
        if let Some(bad) = values.iter().find(|value| !value.is_finite()) {
            return Err(NormalizationError::NonFinite(*bad));
        }

        let Some((min, max)) = values.iter().fold(None, |acc: Option<(f64, f64)>, &v| {
            Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
        }) else {
            return Ok(Vec::new());
        };

        let NormalizationConfig { lower, upper, .. } = self.config;
        if max - min <= FLAT_TOLERANCE {
            return values.iter().map(|&value| self.flat(value)).collect();
        }

        let span = max - min;
        Ok(values
            .iter()
            .map(|&value| lower + (value - min) / span * (upper - lower))
            .collect())
    }

    fn flat(&self, value: f64) -> Result<f64, NormalizationError> {
        let NormalizationConfig { lower, upper, .. } = self.config;
        match self.config.flat_policy {
            FlatPolicy::AbsoluteValue if value.abs() <= FLAT_TOLERANCE => Ok(lower),
            FlatPolicy::AbsoluteValue => Ok(upper),
            FlatPolicy::Floor => Ok(lower),
            FlatPolicy::Midpoint => Ok((lower + upper) / 2.0),
            FlatPolicy::Raw => Ok(value),
            FlatPolicy::Strict => Err(NormalizationError::UndefinedNormalization { value }),
        }
    }
}

/// Normalize with the default settings: global scope, `[0, 100]`,
/// [`FlatPolicy::AbsoluteValue`]
pub fn normalize(scores: &ScoreTable) -> Result<ScoreTable, NormalizationError> {
    Normalizer::default().normalize(scores)
}
