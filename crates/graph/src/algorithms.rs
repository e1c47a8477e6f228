// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Graph algorithms over a built [`GraphIndex`] (spec §4.3).

use crate::indices::{GraphError, GraphIndex};
use cleo_core::{Task, TaskId};
use std::collections::{BTreeSet, HashMap};

/// Lowest common ancestor of `a` and `b`, or `None` if their hierarchy
/// chains never meet (disjoint trees).
pub fn lca(idx: &GraphIndex, a: TaskId, b: TaskId) -> Option<TaskId> {
    let mut ancestors_of_a = BTreeSet::new();
    let mut cur = Some(a);
    ancestors_of_a.insert(a);
    while let Some(id) = cur {
        cur = idx.parent_of(id);
        if let Some(p) = cur {
            ancestors_of_a.insert(p);
        }
    }

    let mut cur = Some(b);
    if ancestors_of_a.contains(&b) {
        return Some(b);
    }
    while let Some(p) = cur.and_then(|id| idx.parent_of(id)) {
        if ancestors_of_a.contains(&p) {
            return Some(p);
        }
        cur = Some(p);
    }
    None
}

/// `depth(a) + depth(b) - 2*depth(lca)`, or `-1` if the trees are disjoint
/// (spec §4.3). Returned as `i64` to carry the sentinel the way the wire
/// format does.
pub fn tree_distance(idx: &GraphIndex, a: TaskId, b: TaskId) -> i64 {
    let (Some(da), Some(db)) = (idx.depth(a), idx.depth(b)) else {
        return -1;
    };
    match lca(idx, a, b) {
        Some(ancestor) => {
            let d_lca = idx.depth(ancestor).unwrap_or(0) as i64;
            da as i64 + db as i64 - 2 * d_lca
        }
        None => -1,
    }
}

/// `wave(t) = 0` if `t.depends` is empty, else `1 + max(wave(d))`.
/// Cycle detection runs before assignment (spec §4.3).
pub fn dependency_waves(tasks: &[Task]) -> Result<HashMap<TaskId, u32>, GraphError> {
    let by_id: HashMap<TaskId, &Task> = tasks.iter().map(|t| (t.id, t)).collect();
    let mut waves = HashMap::new();

    for &id in by_id.keys() {
        let mut guard = BTreeSet::new();
        compute_wave(id, &by_id, &mut waves, &mut guard)?;
    }
    Ok(waves)
}

fn compute_wave(
    id: TaskId,
    by_id: &HashMap<TaskId, &Task>,
    waves: &mut HashMap<TaskId, u32>,
    guard: &mut BTreeSet<TaskId>,
) -> Result<u32, GraphError> {
    if let Some(&w) = waves.get(&id) {
        return Ok(w);
    }
    if !guard.insert(id) {
        return Err(GraphError::CycleDetected(guard.iter().copied().collect()));
    }
    let task = match by_id.get(&id) {
        Some(t) => t,
        None => return Ok(0),
    };
    let wave = if task.depends.is_empty() {
        0
    } else {
        let mut max_dep_wave = 0u32;
        for &dep in &task.depends {
            let dep_wave = compute_wave(dep, by_id, waves, guard)?;
            max_dep_wave = max_dep_wave.max(dep_wave);
        }
        1 + max_dep_wave
    };
    guard.remove(&id);
    waves.insert(id, wave);
    Ok(wave)
}

const LABEL_JACCARD_WEIGHT: f64 = 0.6;
const PHASE_MATCH_WEIGHT: f64 = 0.25;
const SIBLING_BOOST: f64 = 0.15;
const COUSIN_BOOST: f64 = 0.08;
const SIGNAL_CAP: f64 = 0.6;

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    inter / union
}

fn hierarchy_boost(idx: &GraphIndex, a: TaskId, b: TaskId) -> f64 {
    let pa = idx.parent_of(a);
    let pb = idx.parent_of(b);
    if pa.is_some() && pa == pb {
        return SIBLING_BOOST;
    }
    let gpa = pa.and_then(|p| idx.parent_of(p));
    let gpb = pb.and_then(|p| idx.parent_of(p));
    if gpa.is_some() && gpa == gpb {
        return COUSIN_BOOST;
    }
    0.0
}

/// Score and rank tasks related to `target` by label Jaccard similarity,
/// phase equality, and a hierarchy-distance boost, returning the top `k`
/// (spec §4.3 "Related discovery"). Deterministic tie-break by task id.
pub fn related(idx: &GraphIndex, tasks: &HashMap<TaskId, Task>, target: TaskId, top_k: usize) -> Vec<(TaskId, f64)> {
    let target_labels = idx.labels_of(target);
    let target_phase = tasks.get(&target).and_then(|t| t.phase.clone());

    let mut scored: Vec<(TaskId, f64)> = idx
        .all_ids()
        .iter()
        .filter(|&&id| id != target)
        .filter_map(|&id| {
            let labels = idx.labels_of(id);
            let label_score = (jaccard(&target_labels, &labels) * LABEL_JACCARD_WEIGHT).min(SIGNAL_CAP);
            let phase_score = match (&target_phase, tasks.get(&id).and_then(|t| t.phase.clone())) {
                (Some(tp), Some(p)) if *tp == p => PHASE_MATCH_WEIGHT,
                _ => 0.0,
            };
            let hierarchy_score = hierarchy_boost(idx, target, id);
            let total = (label_score + phase_score + hierarchy_score).min(1.0);
            (total > 0.0).then_some((id, total))
        })
        .collect();

    scored.sort_by(|(id_a, score_a), (id_b, score_b)| {
        score_b.partial_cmp(score_a).unwrap_or(std::cmp::Ordering::Equal).then_with(|| id_a.cmp(id_b))
    });
    scored.truncate(top_k);
    scored
}

#[cfg(test)]
#[path = "algorithms_tests.rs"]
mod tests;
