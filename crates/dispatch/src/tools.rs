// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tools Domain operations (spec §4.3): related-task discovery and
//! dependency-wave scheduling order. Both are read-only views over a
//! freshly built [`GraphIndex`], the same index `tasks.rs` builds
//! transiently inside `reparent`'s cycle check.

use crate::context::ProjectContext;
use crate::state::TodoFile;
use cleo_core::{CleoError, Clock, TaskId};
use cleo_graph::{dependency_waves, related, GraphIndex};
use std::collections::HashMap;

/// Tasks related to `target` by label/phase/hierarchy similarity (spec §4.3
/// "Related discovery"), highest score first.
pub fn related_to<C: Clock>(ctx: &ProjectContext<C>, target: TaskId, top_k: usize) -> Result<Vec<(TaskId, f64)>, CleoError> {
    let todo = TodoFile::load(&ctx.store, &ctx.paths.todo_file)?;
    let idx = GraphIndex::build(&todo.tasks).map_err(|e| CleoError::Internal(e.to_string()))?;
    let by_id: HashMap<TaskId, cleo_core::Task> = todo.tasks.into_iter().map(|t| (t.id, t)).collect();
    Ok(related(&idx, &by_id, target, top_k))
}

/// Dependency-wave scheduling order for every live task (spec §4.3).
pub fn waves<C: Clock>(ctx: &ProjectContext<C>) -> Result<HashMap<TaskId, u32>, CleoError> {
    let todo = TodoFile::load(&ctx.store, &ctx.paths.todo_file)?;
    dependency_waves(&todo.tasks).map_err(|e| CleoError::Internal(e.to_string()))
}

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tests;
