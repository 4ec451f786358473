//! PageRank-based importance of operational data per mission
//!
//! The graph has parent → child mission edges and mission → datum edges
//! for every recorded use. PageRank follows the usual power iteration with
//! uniform teleport and dangling mass spread uniformly. For each mission,
//! every reachable datum is weighted by its PageRank divided by the node
//! count of the shortest mission → datum path, and the weights are scaled
//! to sum to 1. Unreachable data score 0.

use crate::facts::UsageFacts;
use crate::hierarchy::MissionHierarchy;
use crate::score::{ScoreKey, ScoreTable};
use crate::types::OperationalDatum;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ImportanceError {
    #[error("PageRank did not converge within {iterations} iterations")]
    NotConverged { iterations: usize },

    #[error("Invalid importance configuration: {0}")]
    InvalidConfig(String),
}

/// PageRank settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportanceConfig {
    pub damping: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for ImportanceConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

impl ImportanceConfig {
    pub fn validate(&self) -> Result<(), ImportanceError> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(ImportanceError::InvalidConfig(format!(
                "damping must be in (0, 1), got {}",
                self.damping
            )));
        }
        if self.max_iterations == 0 {
            return Err(ImportanceError::InvalidConfig(
                "max_iterations must be positive".to_string(),
            ));
        }
        if !(self.tolerance > 0.0) {
            return Err(ImportanceError::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Mission/data graph in adjacency-list form. Missions occupy
/// `0..missions`, data follow.
struct UsageGraph {
    successors: Vec<Vec<usize>>,
    missions: usize,
}

impl UsageGraph {
    fn build(hierarchy: &MissionHierarchy, facts: &UsageFacts, data: &[OperationalDatum]) -> Self {
        let missions = hierarchy.len();
        let datum_index: HashMap<_, _> = data
            .iter()
            .enumerate()
            .map(|(i, datum)| (&datum.id, missions + i))
            .collect();

        let mut successors: Vec<Vec<usize>> = hierarchy
            .iter()
            .map(|node| node.children().to_vec())
            .collect();
        successors.resize(missions + data.len(), Vec::new());

        for (datum, mission) in facts.used_pairs() {
            if let (Some(from), Some(&to)) = (hierarchy.position(mission), datum_index.get(datum)) {
                if let Some(edges) = successors.get_mut(from) {
                    edges.push(to);
                }
            }
        }

        Self {
            successors,
            missions,
        }
    }

    fn len(&self) -> usize {
        self.successors.len()
    }

    fn pagerank(&self, config: &ImportanceConfig) -> Result<Vec<f64>, ImportanceError> {
        let n = self.len();
        if n == 0 {
            return Ok(Vec::new());
        }
        let uniform = 1.0 / n as f64;
        let mut rank = vec![uniform; n];

        for iteration in 1..=config.max_iterations {
            let dangling: f64 = self
                .successors
                .iter()
                .zip(&rank)
                .filter(|(edges, _)| edges.is_empty())
                .map(|(_, r)| r)
                .sum();
            let base = (config.damping * dangling + (1.0 - config.damping)) * uniform;

            let mut next = vec![base; n];
            for (node, edges) in self.successors.iter().enumerate() {
                if edges.is_empty() {
                    continue;
                }
                let share = config.damping * rank.get(node).copied().unwrap_or(0.0)
                    / edges.len() as f64;
                for &target in edges {
                    if let Some(slot) = next.get_mut(target) {
                        *slot += share;
                    }
                }
            }

            let delta: f64 = next.iter().zip(&rank).map(|(a, b)| (a - b).abs()).sum();
            rank = next;
            if delta < n as f64 * config.tolerance {
                debug!(iteration, delta, "PageRank converged");
                return Ok(rank);
            }
        }

        Err(ImportanceError::NotConverged {
            iterations: config.max_iterations,
        })
    }

    /// Node count of the shortest path from `start` to every reachable node
    fn path_node_counts(&self, start: usize) -> Vec<Option<usize>> {
        let mut counts = vec![None; self.len()];
        let mut queue = VecDeque::from([start]);
        if let Some(slot) = counts.get_mut(start) {
            *slot = Some(1);
        }

        while let Some(node) = queue.pop_front() {
            let count = counts.get(node).copied().flatten().unwrap_or(1);
            for &next in self.successors.get(node).into_iter().flatten() {
                if let Some(slot) = counts.get_mut(next) {
                    if slot.is_none() {
                        *slot = Some(count + 1);
                        queue.push_back(next);
                    }
                }
            }
        }
        counts
    }
}

pub struct ImportanceAnalyzer<'a> {
    hierarchy: &'a MissionHierarchy,
    facts: &'a UsageFacts,
    config: ImportanceConfig,
}

impl<'a> ImportanceAnalyzer<'a> {
    pub fn new(hierarchy: &'a MissionHierarchy, facts: &'a UsageFacts) -> Self {
        Self {
            hierarchy,
            facts,
            config: ImportanceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ImportanceConfig) -> Self {
        self.config = config;
        self
    }

    /// PageRank of every mission and datum, missions first
    pub fn pagerank(&self, data: &[OperationalDatum]) -> Result<Vec<f64>, ImportanceError> {
        self.config.validate()?;
        UsageGraph::build(self.hierarchy, self.facts, data).pagerank(&self.config)
    }

    /// Importance of every datum for every mission; each mission's
    /// importances sum to 1 unless it reaches no data at all.
    pub fn analyze(&self, data: &[OperationalDatum]) -> Result<ScoreTable, ImportanceError> {
        self.config.validate()?;
        let graph = UsageGraph::build(self.hierarchy, self.facts, data);
        let rank = graph.pagerank(&self.config)?;

        let mut table = ScoreTable::new();
        for (position, mission) in self.hierarchy.iter().enumerate() {
            let counts = graph.path_node_counts(position);
            let adjusted: Vec<f64> = data
                .iter()
                .enumerate()
                .map(|(i, _)| {
                    let node = graph.missions + i;
                    match (counts.get(node).copied().flatten(), rank.get(node)) {
                        (Some(count), Some(&r)) => r / count as f64,
                        _ => 0.0,
                    }
                })
                .collect();

            let total: f64 = adjusted.iter().sum();
            let divisor = if total > 0.0 { total } else { 1.0 };
            for (datum, weight) in data.iter().zip(adjusted) {
                table.insert(
                    ScoreKey::new(datum.id.clone(), mission.id().clone()),
                    weight / divisor,
                );
            }
        }

        info!(
            missions = self.hierarchy.len(),
            data = data.len(),
            "Importance analysis complete"
        );
        Ok(table)
    }
}
