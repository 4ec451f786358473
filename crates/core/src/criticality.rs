//! Breadth criticality of operational data
//!
//! `breadth` counts the missions that use a datum directly. The raw score
//! is `breadth + 1 / (depth + 1)` where `depth` is the datum's distance
//! from the top of the usage graph; usage edges point from data to
//! missions, so a datum never has predecessors and its depth is 0. Raw
//! scores are min-max rescaled into a configurable range (1–4 by default),
//! ties collapsing to the lower bound.

use crate::facts::UsageFacts;
use crate::hierarchy::MissionHierarchy;
use crate::normalization::{FlatPolicy, NormalizationConfig, NormalizationError, Normalizer};
use crate::types::{DatumId, OperationalDatum};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Depth of every datum in the usage graph
const DATUM_DEPTH: usize = 0;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CriticalityError {
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
}

/// Target range of normalized criticality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticalityConfig {
    pub lower: f64,
    pub upper: f64,
}

impl Default for CriticalityConfig {
    fn default() -> Self {
        Self {
            lower: 1.0,
            upper: 4.0,
        }
    }
}

/// Criticality of one datum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalityScore {
    pub datum: DatumId,
    pub label: String,
    pub breadth: usize,
    pub depth: usize,
    pub raw: f64,
    pub normalized: f64,
}

pub struct CriticalityAnalyzer<'a> {
    hierarchy: &'a MissionHierarchy,
    facts: &'a UsageFacts,
    config: CriticalityConfig,
}

impl<'a> CriticalityAnalyzer<'a> {
    pub fn new(hierarchy: &'a MissionHierarchy, facts: &'a UsageFacts) -> Self {
        Self {
            hierarchy,
            facts,
            config: CriticalityConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CriticalityConfig) -> Self {
        self.config = config;
        self
    }

    /// Score every datum, in input order
    pub fn analyze(
        &self,
        data: &[OperationalDatum],
    ) -> Result<Vec<CriticalityScore>, CriticalityError> {
        let mut scores: Vec<CriticalityScore> = data
            .iter()
            .map(|datum| {
                let breadth = self
                    .facts
                    .missions_using(&datum.id)
                    .filter(|mission| self.hierarchy.contains(mission))
                    .count();
                let raw = breadth as f64 + 1.0 / (DATUM_DEPTH as f64 + 1.0);

                CriticalityScore {
                    datum: datum.id.clone(),
                    label: datum.label().to_string(),
                    breadth,
                    depth: DATUM_DEPTH,
                    raw,
                    normalized: raw,
                }
            })
            .collect();

        let normalizer = Normalizer::new(NormalizationConfig {
            lower: self.config.lower,
            upper: self.config.upper,
            flat_policy: FlatPolicy::Floor,
            ..NormalizationConfig::default()
        });
        let raw: Vec<f64> = scores.iter().map(|score| score.raw).collect();
        for (score, normalized) in scores.iter_mut().zip(normalizer.rescale(&raw)?) {
            score.normalized = normalized;
        }

        debug!(data = scores.len(), "Criticality computed");
        Ok(scores)
    }
}
