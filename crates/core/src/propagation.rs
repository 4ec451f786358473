//! Bottom-up utilization propagation
//!
//! A leaf mission scores 1.0 for a datum it uses and 0.0 otherwise. Every
//! other mission scores the arithmetic mean of its children. Scores are
//! memoized per datum for the duration of one pass, so each
//! `(datum, mission)` pair is evaluated once even when missions are shared
//! between several parents.
//!
//! Traversal uses an explicit stack; deep hierarchies do not grow the call
//! stack, and a mission met again while still on the traversal path is
//! reported as [`PropagationError::CyclicHierarchy`].

use crate::facts::UsageFacts;
use crate::hierarchy::MissionHierarchy;
use crate::score::{ScoreKey, ScoreTable};
use crate::types::{DatumId, MissionId, MissionKind, OperationalDatum};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while scoring a `(datum, mission)` pair
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PropagationError {
    #[error("Mission {mission} is not a leaf but has no children")]
    EmptyChildSet { mission: MissionId },

    #[error("Cyclic mission hierarchy: {}", join_path(.cycle))]
    CyclicHierarchy { cycle: Vec<MissionId> },

    #[error("Unknown mission: {0}")]
    UnknownMission(MissionId),
}

fn join_path(cycle: &[MissionId]) -> String {
    cycle
        .iter()
        .map(MissionId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Propagation settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Evaluate data items on the rayon pool (needs the `parallel` feature)
    pub parallel: bool,
}

/// A pair that could not be scored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairFailure {
    pub datum: DatumId,
    pub mission: MissionId,
    pub error: PropagationError,
}

/// Result of scoring a whole batch
#[derive(Debug, Clone, Default)]
pub struct PropagationOutcome {
    /// Raw utilization of every pair that could be scored
    pub scores: ScoreTable,
    /// Pairs that could not be scored, in datum then mission order
    pub failures: Vec<PairFailure>,
}

impl PropagationOutcome {
    /// True when every requested pair was scored
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Computes utilization scores over a fixed hierarchy and fact table
#[derive(Debug, Clone)]
pub struct ScorePropagator<'a> {
    hierarchy: &'a MissionHierarchy,
    facts: &'a UsageFacts,
    config: PropagationConfig,
}

impl<'a> ScorePropagator<'a> {
    pub fn new(hierarchy: &'a MissionHierarchy, facts: &'a UsageFacts) -> Self {
        Self {
            hierarchy,
            facts,
            config: PropagationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PropagationConfig) -> Self {
        self.config = config;
        self
    }

    /// Utilization `u(datum, mission)` in `[0, 1]`
    pub fn compute_utilization(
        &self,
        datum: &DatumId,
        mission: &MissionId,
    ) -> Result<f64, PropagationError> {
        let position = self
            .hierarchy
            .position(mission)
            .ok_or_else(|| PropagationError::UnknownMission(mission.clone()))?;

        DatumPass::new(self.hierarchy, self.facts, datum).evaluate(position)
    }

    /// Score one datum against every mission, sharing a single memo table
    pub fn propagate_datum(&self, datum: &DatumId) -> PropagationOutcome {
        let mut pass = DatumPass::new(self.hierarchy, self.facts, datum);
        let mut outcome = PropagationOutcome::default();

        for (position, node) in self.hierarchy.iter().enumerate() {
            match pass.evaluate(position) {
                Ok(score) => outcome
                    .scores
                    .insert(ScoreKey::new(datum.clone(), node.id().clone()), score),
                Err(error) => {
                    warn!(datum = %datum, mission = %node.id(), %error, "Pair could not be scored");
                    outcome.failures.push(PairFailure {
                        datum: datum.clone(),
                        mission: node.id().clone(),
                        error,
                    });
                }
            }
        }

        debug!(
            datum = %datum,
            scored = outcome.scores.len(),
            failed = outcome.failures.len(),
            "Datum propagated"
        );
        outcome
    }

    /// Score every datum against every mission.
    ///
    /// Data are independent of each other; a failing pair only affects
    /// pairs that depend on the same mission for the same datum.
    pub fn propagate_all(&self, data: &[OperationalDatum]) -> PropagationOutcome {
        let per_datum = self.propagate_each(data);

        let mut merged = PropagationOutcome::default();
        for outcome in per_datum {
            merged.scores.extend(outcome.scores.iter().map(|(k, s)| (k.clone(), s)));
            merged.failures.extend(outcome.failures);
        }

        info!(
            data = data.len(),
            missions = self.hierarchy.len(),
            scored = merged.scores.len(),
            failed = merged.failures.len(),
            "Propagation pass complete"
        );
        merged
    }

    #[cfg(feature = "parallel")]
    fn propagate_each(&self, data: &[OperationalDatum]) -> Vec<PropagationOutcome> {
        use rayon::prelude::*;

        if self.config.parallel {
            // Ordered collect keeps the merge deterministic.
            return data
                .par_iter()
                .map(|datum| self.propagate_datum(&datum.id))
                .collect();
        }
        data.iter().map(|datum| self.propagate_datum(&datum.id)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn propagate_each(&self, data: &[OperationalDatum]) -> Vec<PropagationOutcome> {
        if self.config.parallel {
            debug!("Parallel propagation requested but the `parallel` feature is disabled");
        }
        data.iter().map(|datum| self.propagate_datum(&datum.id)).collect()
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Unvisited,
    OnPath,
    Done(f64),
    Failed(PropagationError),
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    position: usize,
    next_child: usize,
    sum: f64,
}

impl Frame {
    fn new(position: usize) -> Self {
        Self {
            position,
            next_child: 0,
            sum: 0.0,
        }
    }
}

enum Step {
    Descend(usize),
    Accumulate(f64),
    Finish(f64),
    Fail(PropagationError),
}

/// Memo partition for a single datum
struct DatumPass<'a> {
    hierarchy: &'a MissionHierarchy,
    facts: &'a UsageFacts,
    datum: &'a DatumId,
    slots: Vec<Slot>,
}

impl<'a> DatumPass<'a> {
    fn new(hierarchy: &'a MissionHierarchy, facts: &'a UsageFacts, datum: &'a DatumId) -> Self {
        Self {
            hierarchy,
            facts,
            datum,
            slots: vec![Slot::Unvisited; hierarchy.len()],
        }
    }

    fn evaluate(&mut self, start: usize) -> Result<f64, PropagationError> {
        match self.slots.get(start) {
            Some(Slot::Done(score)) => return Ok(*score),
            Some(Slot::Failed(error)) => return Err(error.clone()),
            _ => {}
        }

        let mut current = Frame::new(start);
        let mut parents: Vec<Frame> = Vec::new();
        self.set(start, Slot::OnPath);

        loop {
            match self.step(&current, &parents) {
                Step::Accumulate(score) => {
                    current.next_child += 1;
                    current.sum += score;
                }
                Step::Descend(child) => {
                    current.next_child += 1;
                    parents.push(current);
                    current = Frame::new(child);
                    self.set(child, Slot::OnPath);
                }
                Step::Finish(score) => {
                    self.set(current.position, Slot::Done(score));
                    match parents.pop() {
                        Some(mut parent) => {
                            parent.sum += score;
                            current = parent;
                        }
                        None => return Ok(score),
                    }
                }
                Step::Fail(error) => {
                    // Everything still on the path depends on the failed mission.
                    self.set(current.position, Slot::Failed(error.clone()));
                    for frame in &parents {
                        self.set(frame.position, Slot::Failed(error.clone()));
                    }
                    return Err(error);
                }
            }
        }
    }

    fn step(&self, current: &Frame, parents: &[Frame]) -> Step {
        let Some(node) = self.hierarchy.node(current.position) else {
            return Step::Fail(PropagationError::UnknownMission(MissionId::new(format!(
                "#{}",
                current.position
            ))));
        };

        if node.kind() == MissionKind::Leaf {
            let used = self.facts.is_used(self.datum, node.id());
            return Step::Finish(if used { 1.0 } else { 0.0 });
        }

        let children = node.children();
        if children.is_empty() {
            return Step::Fail(PropagationError::EmptyChildSet {
                mission: node.id().clone(),
            });
        }

        let Some(&child) = children.get(current.next_child) else {
            return Step::Finish(current.sum / children.len() as f64);
        };

        match self.slots.get(child) {
            Some(Slot::Done(score)) => Step::Accumulate(*score),
            Some(Slot::Failed(error)) => Step::Fail(error.clone()),
            Some(Slot::OnPath) => Step::Fail(PropagationError::CyclicHierarchy {
                cycle: self.cycle_through(child, current, parents),
            }),
            Some(Slot::Unvisited) | None => Step::Descend(child),
        }
    }

    /// Missions from `entry` down the current path and back to `entry`
    fn cycle_through(&self, entry: usize, current: &Frame, parents: &[Frame]) -> Vec<MissionId> {
        let path = parents
            .iter()
            .map(|frame| frame.position)
            .chain(std::iter::once(current.position));
        let from_entry = path.skip_while(|&position| position != entry);

        from_entry
            .chain(std::iter::once(entry))
            .filter_map(|position| self.hierarchy.node(position).map(|n| n.id().clone()))
            .collect()
    }

    fn set(&mut self, position: usize, slot: Slot) {
        if let Some(existing) = self.slots.get_mut(position) {
            *existing = slot;
        }
    }
}
