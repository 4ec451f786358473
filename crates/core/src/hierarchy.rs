//! Mission hierarchy
//!
//! Arena of missions with parent → child edges. Missions are addressed by
//! their position in the arena internally and by [`MissionId`] externally.
//! Building a hierarchy checks identifiers and references; cycles are only
//! reported when a traversal runs into one, so that missions outside a
//! cycle remain scoreable.

use crate::types::{MissionId, MissionKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

/// Errors raised while building or ordering a hierarchy
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("Duplicate mission: {0}")]
    DuplicateMission(MissionId),

    #[error("Unknown mission {mission} referenced by {referenced_by}")]
    UnknownMission {
        mission: MissionId,
        referenced_by: String,
    },

    #[error("Mission {0} is declared as a leaf but has children")]
    LeafWithChildren(MissionId),

    #[error("Mission hierarchy contains a cycle through {0:?}")]
    Cyclic(Vec<MissionId>),
}

/// A mission inside a [`MissionHierarchy`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionNode {
    id: MissionId,
    name: Option<String>,
    kind: MissionKind,
    children: Vec<usize>,
    parents: Vec<usize>,
}

impl MissionNode {
    pub fn id(&self) -> &MissionId {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name for reports, falling back to the identifier
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    pub fn kind(&self) -> MissionKind {
        self.kind
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == MissionKind::Leaf
    }

    /// Arena positions of the children
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Arena positions of the parents
    pub fn parents(&self) -> &[usize] {
        &self.parents
    }
}

/// Validated mission hierarchy (tree or DAG)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissionHierarchy {
    nodes: Vec<MissionNode>,
    index: HashMap<MissionId, usize>,
}

impl MissionHierarchy {
    /// Start building a hierarchy
    pub fn builder() -> MissionHierarchyBuilder {
        MissionHierarchyBuilder::new()
    }

    /// Number of missions
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Arena position of a mission
    pub fn position(&self, id: &MissionId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Look up a mission by identifier
    pub fn get(&self, id: &MissionId) -> Option<&MissionNode> {
        self.position(id).and_then(|pos| self.nodes.get(pos))
    }

    /// Look up a mission by arena position
    pub fn node(&self, position: usize) -> Option<&MissionNode> {
        self.nodes.get(position)
    }

    pub fn contains(&self, id: &MissionId) -> bool {
        self.index.contains_key(id)
    }

    /// Missions in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &MissionNode> {
        self.nodes.iter()
    }

    /// Identifiers in insertion order
    pub fn mission_ids(&self) -> impl Iterator<Item = &MissionId> {
        self.nodes.iter().map(|node| &node.id)
    }

    /// Children of a mission, by identifier
    pub fn children_of(&self, id: &MissionId) -> Vec<&MissionId> {
        self.get(id)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|&pos| self.nodes.get(pos).map(|child| &child.id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Missions without parents
    pub fn roots(&self) -> Vec<&MissionId> {
        self.nodes
            .iter()
            .filter(|node| node.parents.is_empty())
            .map(|node| &node.id)
            .collect()
    }

    /// Missions scored directly from usage facts
    pub fn leaves(&self) -> Vec<&MissionId> {
        self.nodes
            .iter()
            .filter(|node| node.is_leaf())
            .map(|node| &node.id)
            .collect()
    }

    /// Parents-before-children ordering of every mission.
    ///
    /// Fails with [`HierarchyError::Cyclic`] naming the missions that could
    /// not be ordered when the hierarchy contains a cycle.
    pub fn topological_order(&self) -> Result<Vec<usize>, HierarchyError> {
        let mut in_degree: Vec<usize> = self.nodes.iter().map(|n| n.parents.len()).collect();
        let mut ready: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(pos, _)| pos)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(pos) = ready.pop_front() {
            order.push(pos);
            let Some(node) = self.nodes.get(pos) else {
                continue;
            };
            for &child in &node.children {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(child);
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            return Ok(order);
        }

        let ordered: HashSet<usize> = order.into_iter().collect();
        let stuck = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(pos, _)| !ordered.contains(pos))
            .map(|(_, node)| node.id.clone())
            .collect();
        Err(HierarchyError::Cyclic(stuck))
    }
}

#[derive(Debug, Clone)]
struct PendingMission {
    id: MissionId,
    name: Option<String>,
    kind: Option<MissionKind>,
}

/// Builder for [`MissionHierarchy`]
#[derive(Debug, Clone, Default)]
pub struct MissionHierarchyBuilder {
    missions: Vec<PendingMission>,
    edges: Vec<(MissionId, MissionId)>,
}

impl MissionHierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mission whose kind is inferred from its children
    pub fn mission(mut self, id: impl Into<MissionId>) -> Self {
        self.push(id.into(), None, None);
        self
    }

    /// Add a mission with a display name
    pub fn named_mission(mut self, id: impl Into<MissionId>, name: impl Into<String>) -> Self {
        self.push(id.into(), Some(name.into()), None);
        self
    }

    /// Add a mission with an explicit kind
    pub fn mission_with_kind(
        mut self,
        id: impl Into<MissionId>,
        name: Option<String>,
        kind: Option<MissionKind>,
    ) -> Self {
        self.push(id.into(), name, kind);
        self
    }

    /// Add a mission declared composite regardless of its children
    pub fn composite(mut self, id: impl Into<MissionId>) -> Self {
        self.push(id.into(), None, Some(MissionKind::Composite));
        self
    }

    /// Add a parent → child edge
    pub fn child(mut self, parent: impl Into<MissionId>, child: impl Into<MissionId>) -> Self {
        self.edges.push((parent.into(), child.into()));
        self
    }

    fn push(&mut self, id: MissionId, name: Option<String>, kind: Option<MissionKind>) {
        self.missions.push(PendingMission { id, name, kind });
    }

    /// Validate identifiers and references and freeze the hierarchy
    pub fn build(self) -> Result<MissionHierarchy, HierarchyError> {
        let mut index = HashMap::with_capacity(self.missions.len());
        let mut nodes = Vec::with_capacity(self.missions.len());
        let mut declared = Vec::with_capacity(self.missions.len());

        for (pos, pending) in self.missions.into_iter().enumerate() {
            if index.insert(pending.id.clone(), pos).is_some() {
                return Err(HierarchyError::DuplicateMission(pending.id));
            }
            declared.push(pending.kind);
            nodes.push(MissionNode {
                id: pending.id,
                name: pending.name,
                kind: MissionKind::Leaf,
                children: Vec::new(),
                parents: Vec::new(),
            });
        }

        let mut seen_edges = HashSet::with_capacity(self.edges.len());
        for (parent, child) in self.edges {
            let parent_pos = *index
                .get(&parent)
                .ok_or_else(|| HierarchyError::UnknownMission {
                    mission: parent.clone(),
                    referenced_by: format!("edge {} -> {}", parent, child),
                })?;
            let child_pos = *index
                .get(&child)
                .ok_or_else(|| HierarchyError::UnknownMission {
                    mission: child.clone(),
                    referenced_by: format!("edge {} -> {}", parent, child),
                })?;

            // Children form a set; repeated edges collapse.
            if !seen_edges.insert((parent_pos, child_pos)) {
                continue;
            }
            if let Some(node) = nodes.get_mut(parent_pos) {
                node.children.push(child_pos);
            }
            if let Some(node) = nodes.get_mut(child_pos) {
                node.parents.push(parent_pos);
            }
        }

        for (node, kind) in nodes.iter_mut().zip(declared) {
            node.kind = match kind {
                Some(MissionKind::Leaf) if !node.children.is_empty() => {
                    return Err(HierarchyError::LeafWithChildren(node.id.clone()));
                }
                Some(kind) => kind,
                None if node.children.is_empty() => MissionKind::Leaf,
                None => MissionKind::Composite,
            };
        }

        Ok(MissionHierarchy { nodes, index })
    }
}
