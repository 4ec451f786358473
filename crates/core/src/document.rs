//! Scoring input document
//!
//! JSON payload describing missions, operational data, the mission
//! hierarchy and mission/data usage relations:
//!
//! ```json
//! {
//!   "Mission": [{"UUID": "m1", "Name": "Root"}, {"UUID": "m2", "Name": "Recon"}],
//!   "OperationalData": [{"UUID": "d1", "Name": "Weather"}],
//!   "MissionHierarchy": [{"ParentMission": "m1", "ChildMission": "m2"}],
//!   "Mission_OperationalData": [{"Mission": "m2", "OperationalData": "d1"}]
//! }
//! ```

use crate::facts::UsageFacts;
use crate::hierarchy::{HierarchyError, MissionHierarchy};
use crate::types::{DatumId, MissionId, MissionKind, OperationalDatum};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Document errors
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read document: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid mission hierarchy: {0}")]
    Hierarchy(#[from] HierarchyError),

    #[error("Duplicate operational datum: {0}")]
    DuplicateDatum(DatumId),

    #[error("Usage relation references unknown mission {0}")]
    UnknownMission(MissionId),

    #[error("Usage relation references unknown operational datum {0}")]
    UnknownDatum(DatumId),
}

/// Mission record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionRecord {
    #[serde(rename = "UUID")]
    pub id: MissionId,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Kind", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MissionKind>,
}

/// Operational datum record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatumRecord {
    #[serde(rename = "UUID")]
    pub id: DatumId,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Parent → child edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyRecord {
    #[serde(rename = "ParentMission")]
    pub parent: MissionId,
    #[serde(rename = "ChildMission")]
    pub child: MissionId,
}

/// Mission directly uses datum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    #[serde(rename = "Mission")]
    pub mission: MissionId,
    #[serde(rename = "OperationalData")]
    pub datum: DatumId,
}

/// The whole input document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringDocument {
    #[serde(rename = "Mission")]
    pub missions: Vec<MissionRecord>,
    #[serde(rename = "OperationalData")]
    pub data: Vec<DatumRecord>,
    #[serde(rename = "MissionHierarchy", default)]
    pub hierarchy: Vec<HierarchyRecord>,
    #[serde(rename = "Mission_OperationalData", default)]
    pub usage: Vec<UsageRecord>,
}

/// Validated inputs for one scoring run
#[derive(Debug, Clone)]
pub struct ScoringInput {
    pub hierarchy: MissionHierarchy,
    /// Data in document order
    pub data: Vec<OperationalDatum>,
    pub facts: UsageFacts,
}

impl ScoringDocument {
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Validate references and build the scoring input.
    ///
    /// Usage relations on composite missions are kept (importance analysis
    /// reads them) but never reach propagation, which only consults leaves.
    pub fn into_input(self) -> Result<ScoringInput, DocumentError> {
        let mut builder = MissionHierarchy::builder();
        for record in self.missions {
            builder = builder.mission_with_kind(record.id, record.name, record.kind);
        }
        for edge in self.hierarchy {
            builder = builder.child(edge.parent, edge.child);
        }
        let hierarchy = builder.build()?;

        let mut seen = HashSet::with_capacity(self.data.len());
        let mut data = Vec::with_capacity(self.data.len());
        for record in self.data {
            if !seen.insert(record.id.clone()) {
                return Err(DocumentError::DuplicateDatum(record.id));
            }
            data.push(OperationalDatum {
                id: record.id,
                name: record.name,
            });
        }

        let mut facts = UsageFacts::new();
        for usage in self.usage {
            let mission = hierarchy
                .get(&usage.mission)
                .ok_or_else(|| DocumentError::UnknownMission(usage.mission.clone()))?;
            if !seen.contains(&usage.datum) {
                return Err(DocumentError::UnknownDatum(usage.datum));
            }
            if !mission.is_leaf() {
                warn!(
                    mission = %usage.mission,
                    datum = %usage.datum,
                    "Usage relation on a composite mission is ignored by propagation"
                );
            }
            facts.mark_used(usage.datum, usage.mission);
        }

        debug!(
            missions = hierarchy.len(),
            data = data.len(),
            facts = facts.len(),
            "Scoring document loaded"
        );
        Ok(ScoringInput {
            hierarchy,
            data,
            facts,
        })
    }
}
