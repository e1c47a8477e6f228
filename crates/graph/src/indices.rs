// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Derived indices over the live task set (spec §4.3).
//!
//! Rebuilt lazily from the canonical `tasks` array on load and after every
//! mutation, the way `MaterializedState` in oj-storage rebuilds its indices
//! from the WAL rather than mutating them incrementally.

use cleo_core::{Task, TaskId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("cycle detected among tasks: {0:?}")]
    CycleDetected(Vec<TaskId>),
    #[error("duplicate task id: {0}")]
    DuplicateId(TaskId),
}

/// O(1)-lookup indices rebuilt from the live task list.
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    parent_of: HashMap<TaskId, TaskId>,
    /// Children in position order, per parent.
    children_of: HashMap<TaskId, Vec<TaskId>>,
    depth_of: HashMap<TaskId, u32>,
    child_count_of: HashMap<TaskId, usize>,
    label_index: BTreeMap<String, BTreeSet<TaskId>>,
    phase_index: BTreeMap<String, BTreeSet<TaskId>>,
    all_ids: BTreeSet<TaskId>,
}

impl GraphIndex {
    /// Build indices from the canonical task list. Errors on duplicate ids
    /// or a parent cycle (spec §3.1: "depends forms a DAG"; hierarchy must
    /// also be acyclic for depth/LCA to terminate).
    pub fn build(tasks: &[Task]) -> Result<Self, GraphError> {
        let mut idx = GraphIndex::default();

        for t in tasks {
            if !idx.all_ids.insert(t.id) {
                return Err(GraphError::DuplicateId(t.id));
            }
            if let Some(parent) = t.parent_id {
                idx.parent_of.insert(t.id, parent);
            }
            for label in &t.labels {
                idx.label_index.entry(label.clone()).or_default().insert(t.id);
            }
            if let Some(phase) = &t.phase {
                idx.phase_index.entry(phase.clone()).or_default().insert(t.id);
            }
        }

        let mut ordered: Vec<&Task> = tasks.iter().collect();
        ordered.sort_by_key(|t| (t.parent_id.map(|p| p.to_string()), t.position));
        for t in ordered {
            if let Some(parent) = t.parent_id {
                idx.children_of.entry(parent).or_default().push(t.id);
            }
        }
        for (parent, children) in &idx.children_of {
            idx.child_count_of.insert(*parent, children.len());
        }

        idx.check_hierarchy_acyclic()?;
        for id in idx.all_ids.clone() {
            let depth = idx.climb_depth(id, &mut BTreeSet::new())?;
            idx.depth_of.insert(id, depth);
        }

        Ok(idx)
    }

    fn check_hierarchy_acyclic(&self) -> Result<(), GraphError> {
        for &start in &self.all_ids {
            let mut seen = BTreeSet::new();
            let mut cur = start;
            loop {
                if !seen.insert(cur) {
                    return Err(GraphError::CycleDetected(seen.into_iter().collect()));
                }
                match self.parent_of.get(&cur) {
                    Some(&parent) => cur = parent,
                    None => break,
                }
            }
        }
        Ok(())
    }

    fn climb_depth(&self, id: TaskId, guard: &mut BTreeSet<TaskId>) -> Result<u32, GraphError> {
        if !guard.insert(id) {
            return Err(GraphError::CycleDetected(guard.iter().copied().collect()));
        }
        match self.parent_of.get(&id) {
            None => Ok(0),
            Some(&parent) => Ok(1 + self.climb_depth(parent, guard)?),
        }
    }

    pub fn parent_of(&self, id: TaskId) -> Option<TaskId> {
        self.parent_of.get(&id).copied()
    }

    pub fn children_of(&self, id: TaskId) -> &[TaskId] {
        self.children_of.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn child_count(&self, id: TaskId) -> usize {
        self.child_count_of.get(&id).copied().unwrap_or(0)
    }

    pub fn depth(&self, id: TaskId) -> Option<u32> {
        self.depth_of.get(&id).copied()
    }

    pub fn by_label(&self, label: &str) -> &BTreeSet<TaskId> {
        self.label_index.get(label).unwrap_or(&EMPTY_SET)
    }

    pub fn by_phase(&self, phase: &str) -> &BTreeSet<TaskId> {
        self.phase_index.get(phase).unwrap_or(&EMPTY_SET)
    }

    pub fn labels_of(&self, id: TaskId) -> BTreeSet<String> {
        self.label_index
            .iter()
            .filter(|(_, ids)| ids.contains(&id))
            .map(|(label, _)| label.clone())
            .collect()
    }

    pub fn all_ids(&self) -> &BTreeSet<TaskId> {
        &self.all_ids
    }

    /// Siblings of `id` (same parent, excluding `id` itself).
    pub fn siblings_of(&self, id: TaskId) -> Vec<TaskId> {
        match self.parent_of(id) {
            Some(parent) => self.children_of(parent).iter().copied().filter(|&s| s != id).collect(),
            None => Vec::new(),
        }
    }
}

static EMPTY_SET: BTreeSet<TaskId> = BTreeSet::new();

#[cfg(test)]
#[path = "indices_tests.rs"]
mod tests;
