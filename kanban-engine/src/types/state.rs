//! The root state: every board plus the active board reference.

use super::board::{Board, Column};
use super::task::Task;
use crate::error::{EntityKind, KanbanError, Result};
use crate::ids::{BoardId, ColumnId, TaskId};
use crate::tags;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A complete, immutable snapshot of all boards.
///
/// Mutations never edit a snapshot in place; they clone it, change the clone
/// and hand back the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BoardState {
    pub boards: Vec<Board>,
    /// Required in the document, `null` when no board is active
    #[serde(deserialize_with = "Option::deserialize")]
    pub active_board_id: Option<BoardId>,
}

impl BoardState {
    /// A state with no boards
    pub fn empty() -> Self {
        Self::default()
    }

    /// The state used when nothing has been persisted yet: one active board,
    /// optionally pre-populated with a column per workflow state.
    pub fn seed(board_name: &str, default_columns: bool) -> Self {
        let mut board = Board::new(BoardId::new(), board_name);
        if default_columns {
            board.columns = Board::default_columns(&board.id);
        }
        Self {
            active_board_id: Some(board.id.clone()),
            boards: vec![board],
        }
    }

    /// Find a board by id
    pub fn board(&self, id: &BoardId) -> Result<&Board> {
        self.boards
            .iter()
            .find(|b| &b.id == id)
            .ok_or_else(|| KanbanError::not_found(EntityKind::Board, id))
    }

    /// Find a board by id for mutation
    pub fn board_mut(&mut self, id: &BoardId) -> Result<&mut Board> {
        self.boards
            .iter_mut()
            .find(|b| &b.id == id)
            .ok_or_else(|| KanbanError::not_found(EntityKind::Board, id))
    }

    /// Position of a board in the board list
    pub fn board_index(&self, id: &BoardId) -> Result<usize> {
        self.boards
            .iter()
            .position(|b| &b.id == id)
            .ok_or_else(|| KanbanError::not_found(EntityKind::Board, id))
    }

    /// Resolve a column through its board
    pub fn column(&self, board_id: &BoardId, column_id: &ColumnId) -> Result<&Column> {
        self.board(board_id)?.column(column_id)
    }

    /// Resolve a task through its board and column
    pub fn task(
        &self,
        board_id: &BoardId,
        column_id: &ColumnId,
        task_id: &TaskId,
    ) -> Result<&Task> {
        self.column(board_id, column_id)?.task(task_id)
    }

    pub fn contains_board(&self, id: &BoardId) -> bool {
        self.boards.iter().any(|b| &b.id == id)
    }

    pub fn contains_column(&self, id: &ColumnId) -> bool {
        self.columns().any(|c| &c.id == id)
    }

    pub fn contains_task(&self, id: &TaskId) -> bool {
        self.tasks().any(|t| &t.id == id)
    }

    /// Every column of every board
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.boards.iter().flat_map(|b| b.columns.iter())
    }

    /// Every task of every board
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns().flat_map(|c| c.tasks.iter())
    }

    /// Restore back-references from containment. Called after deserializing.
    pub fn relink(&mut self) {
        for board in &mut self.boards {
            for column in &mut board.columns {
                column.board_id = board.id.clone();
                for task in &mut column.tasks {
                    task.board_id = board.id.clone();
                    task.column_id = column.id.clone();
                }
            }
        }
    }

    /// Verify every structural invariant of the state.
    ///
    /// Returns `CorruptData` naming the first violation found.
    pub fn check_integrity(&self) -> Result<()> {
        let mut board_ids = HashSet::new();
        let mut column_ids = HashSet::new();
        let mut task_ids = HashSet::new();

        for board in &self.boards {
            if !board_ids.insert(&board.id) {
                return Err(KanbanError::corrupt(format!("duplicate board id {}", board.id)));
            }
            if board.name.trim().is_empty() {
                return Err(KanbanError::corrupt(format!("board {} has an empty name", board.id)));
            }

            let mut titles = HashSet::new();
            for column in &board.columns {
                if !column_ids.insert(&column.id) {
                    return Err(KanbanError::corrupt(format!(
                        "duplicate column id {}",
                        column.id
                    )));
                }
                if !titles.insert(column.title) {
                    return Err(KanbanError::corrupt(format!(
                        "board {} has two '{}' columns",
                        board.id, column.title
                    )));
                }
                if column.board_id != board.id {
                    return Err(KanbanError::corrupt(format!(
                        "column {} points at board {} but lives in {}",
                        column.id, column.board_id, board.id
                    )));
                }

                for task in &column.tasks {
                    if !task_ids.insert(&task.id) {
                        return Err(KanbanError::corrupt(format!("duplicate task id {}", task.id)));
                    }
                    if task.title.trim().is_empty() {
                        return Err(KanbanError::corrupt(format!(
                            "task {} has an empty title",
                            task.id
                        )));
                    }
                    if !tags::is_normalized(&task.tags) {
                        return Err(KanbanError::corrupt(format!(
                            "task {} has unnormalized tags",
                            task.id
                        )));
                    }
                    if task.column_id != column.id || task.board_id != board.id {
                        return Err(KanbanError::corrupt(format!(
                            "task {} back-references do not match its container",
                            task.id
                        )));
                    }
                }
            }
        }

        if let Some(active) = &self.active_board_id {
            if !board_ids.contains(active) {
                return Err(KanbanError::corrupt(format!(
                    "active board {active} does not exist"
                )));
            }
        }

        Ok(())
    }
}
