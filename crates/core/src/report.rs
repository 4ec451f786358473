//! Score matrices and result reports
//!
//! A [`ScoreMatrix`] lays scores out with one row per mission and one column
//! per datum, both in input order, and renders as CSV with labels in the
//! header row and first column.

use crate::hierarchy::MissionHierarchy;
use crate::propagation::PropagationOutcome;
use crate::score::{ScoreEntry, ScoreTable};
use crate::types::{DatumId, MissionId, OperationalDatum};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Mission × datum matrix of scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMatrix {
    pub missions: Vec<(MissionId, String)>,
    pub data: Vec<(DatumId, String)>,
    /// `cells[row][column]`; `None` for pairs without a score
    pub cells: Vec<Vec<Option<f64>>>,
}

impl ScoreMatrix {
    pub fn build(
        hierarchy: &MissionHierarchy,
        data: &[OperationalDatum],
        table: &ScoreTable,
    ) -> Self {
        let missions: Vec<(MissionId, String)> = hierarchy
            .iter()
            .map(|node| (node.id().clone(), node.label().to_string()))
            .collect();
        let columns: Vec<(DatumId, String)> = data
            .iter()
            .map(|datum| (datum.id.clone(), datum.label().to_string()))
            .collect();

        let cells = missions
            .iter()
            .map(|(mission, _)| {
                columns
                    .iter()
                    .map(|(datum, _)| table.get(datum, mission))
                    .collect()
            })
            .collect();

        Self {
            missions,
            data: columns,
            cells,
        }
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.cells.get(row)?.get(column).copied().flatten()
    }

    /// Render as CSV, values with `precision` decimals
    pub fn to_csv(&self, precision: usize) -> String {
        let mut out = String::new();
        for (_, label) in &self.data {
            out.push(',');
            out.push_str(&csv_field(label));
        }
        out.push('\n');

        for ((_, label), row) in self.missions.iter().zip(&self.cells) {
            out.push_str(&csv_field(label));
            for cell in row {
                out.push(',');
                if let Some(value) = cell {
                    let _ = write!(out, "{:.*}", precision, value);
                }
            }
            out.push('\n');
        }
        out
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// A pair that failed, flattened for output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub datum: DatumId,
    pub mission: MissionId,
    pub error: String,
}

/// JSON summary of one propagation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringReport {
    pub raw: Vec<ScoreEntry>,
    pub normalized: Vec<ScoreEntry>,
    pub failures: Vec<FailureEntry>,
    /// Min and max raw utilization, absent when nothing was scored
    pub raw_bounds: Option<(f64, f64)>,
}

impl ScoringReport {
    pub fn new(outcome: &PropagationOutcome, normalized: &ScoreTable) -> Self {
        Self {
            raw: outcome.scores.entries(),
            normalized: normalized.entries(),
            failures: outcome
                .failures
                .iter()
                .map(|failure| FailureEntry {
                    datum: failure.datum.clone(),
                    mission: failure.mission.clone(),
                    error: failure.error.to_string(),
                })
                .collect(),
            raw_bounds: outcome.scores.bounds(),
        }
    }
}
