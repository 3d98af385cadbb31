//! Read-only views derived from a snapshot.
//!
//! Nothing here mutates or allocates ids; every function is a pure read of
//! the state it is handed, so callers may cache results per snapshot.

use crate::ids::{BoardId, ColumnId, TaskId};
use crate::types::{Board, BoardState, Column, ColumnState, Priority, Task};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Task count for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnCount {
    pub column_id: ColumnId,
    pub title: ColumnState,
    pub count: usize,
}

/// The board `activeBoardId` points at, if any
pub fn active_board(state: &BoardState) -> Option<&Board> {
    state
        .active_board_id
        .as_ref()
        .and_then(|id| board_by_id(state, id))
}

pub fn board_by_id<'a>(state: &'a BoardState, id: &BoardId) -> Option<&'a Board> {
    state.boards.iter().find(|b| &b.id == id)
}

/// Find a column anywhere in the state. Column ids are unique across boards.
pub fn column_by_id<'a>(state: &'a BoardState, id: &ColumnId) -> Option<&'a Column> {
    state.columns().find(|c| &c.id == id)
}

/// Find a task anywhere in the state; its back-references give its container
pub fn find_task<'a>(state: &'a BoardState, id: &TaskId) -> Option<&'a Task> {
    state.tasks().find(|t| &t.id == id)
}

/// Number of tasks per column, in column order
pub fn task_counts(board: &Board) -> Vec<ColumnCount> {
    board
        .columns
        .iter()
        .map(|c| ColumnCount {
            column_id: c.id.clone(),
            title: c.title,
            count: c.tasks.len(),
        })
        .collect()
}

/// Every distinct tag, sorted.
///
/// With `board` set only that board's tasks are considered; an unknown board
/// yields an empty list.
pub fn tag_list(state: &BoardState, board: Option<&BoardId>) -> Vec<String> {
    let tags: BTreeSet<&str> = state
        .tasks()
        .filter(|t| board.is_none_or(|id| &t.board_id == id))
        .flat_map(|t| t.tags.iter().map(String::as_str))
        .collect();
    tags.into_iter().map(str::to_string).collect()
}

/// Number of tasks at each priority. Every priority is present, zero or not.
pub fn priority_counts(board: &Board) -> BTreeMap<Priority, usize> {
    let mut counts: BTreeMap<Priority, usize> = Priority::ALL.iter().map(|p| (*p, 0)).collect();
    for task in board.columns.iter().flat_map(|c| c.tasks.iter()) {
        *counts.entry(task.priority).or_default() += 1;
    }
    counts
}

/// Column states a title dropdown may offer.
///
/// States already used on the board are excluded, except the current title
/// of `editing` so a column can keep its own label.
pub fn available_column_states(board: &Board, editing: Option<&ColumnId>) -> Vec<ColumnState> {
    ColumnState::ALL
        .into_iter()
        .filter(|state| board.ensure_state_free(*state, editing).is_ok())
        .collect()
}
