//! Board-level types: Board, Column, ColumnState

use super::task::Task;
use crate::error::{EntityKind, KanbanError, Result};
use crate::ids::{BoardId, ColumnId, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of workflow states a column can be titled with.
///
/// This is the only list of column labels in the system: title validation
/// and the presentation layer's icon/color lookup both read from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnState {
    #[serde(rename = "Backlog")]
    Backlog,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Review")]
    Review,
    #[serde(rename = "Done")]
    Done,
}

impl ColumnState {
    /// All states, in default seeding order
    pub const ALL: [ColumnState; 4] = [
        ColumnState::Backlog,
        ColumnState::InProgress,
        ColumnState::Review,
        ColumnState::Done,
    ];

    /// The display label, which is also the persisted column title
    pub fn label(&self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Done => "Done",
        }
    }

    /// Icon name used by the column header
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Backlog => "circle-dashed",
            Self::InProgress => "timer",
            Self::Review => "eye",
            Self::Done => "circle-check",
        }
    }

    /// Stable slug, used to derive the ids of a board's default columns
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    /// 6-character hex color code without #
    pub fn color(&self) -> &'static str {
        match self {
            Self::Backlog => "6b7280",
            Self::InProgress => "f59e0b",
            Self::Review => "8b5cf6",
            Self::Done => "22c55e",
        }
    }
}

impl fmt::Display for ColumnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ColumnState {
    type Err = KanbanError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|state| state.label() == trimmed)
            .ok_or_else(|| {
                KanbanError::conflict(format!(
                    "'{}' is not a column state (expected one of: {})",
                    trimmed,
                    Self::ALL.map(|s| s.label()).join(", ")
                ))
            })
    }
}

/// A board: one workspace of ordered columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub columns: Vec<Column>,
}

impl Board {
    /// Create an empty board
    pub fn new(id: BoardId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Create one column per state, in seeding order.
    ///
    /// Column ids are derived from the board id so that building the same
    /// board twice yields the same columns.
    pub fn default_columns(board_id: &BoardId) -> Vec<Column> {
        ColumnState::ALL
            .into_iter()
            .map(|state| {
                Column::new(
                    ColumnId::from_string(format!("{}-{}", board_id, state.slug())),
                    state,
                    board_id.clone(),
                )
            })
            .collect()
    }

    /// Find a column by id
    pub fn column(&self, id: &ColumnId) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| KanbanError::not_found(EntityKind::Column, id))
    }

    /// Find a column by id for mutation
    pub fn column_mut(&mut self, id: &ColumnId) -> Result<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| KanbanError::not_found(EntityKind::Column, id))
    }

    /// Position of a column in the board's column order
    pub fn column_index(&self, id: &ColumnId) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| KanbanError::not_found(EntityKind::Column, id))
    }

    /// Find the column currently titled with `state`
    pub fn column_with_state(&self, state: ColumnState) -> Option<&Column> {
        self.columns.iter().find(|c| c.title == state)
    }

    /// Reject `state` if another column (other than `except`) already uses it
    pub fn ensure_state_free(&self, state: ColumnState, except: Option<&ColumnId>) -> Result<()> {
        match self.column_with_state(state) {
            Some(existing) if Some(&existing.id) != except => Err(KanbanError::conflict(format!(
                "board '{}' already has a '{}' column",
                self.name, state
            ))),
            _ => Ok(()),
        }
    }

    /// Total number of tasks across all columns
    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }
}

/// A column: an ordered lane of tasks labeled with a workflow state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Column {
    pub id: ColumnId,
    pub title: ColumnState,
    pub tasks: Vec<Task>,
    /// Owning board. Restored from containment on load.
    #[serde(skip, default = "BoardId::unlinked")]
    pub board_id: BoardId,
}

impl Column {
    pub fn new(id: ColumnId, title: ColumnState, board_id: BoardId) -> Self {
        Self {
            id,
            title,
            tasks: Vec::new(),
            board_id,
        }
    }

    /// Find a task by id
    pub fn task(&self, id: &TaskId) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| KanbanError::not_found(EntityKind::Task, id))
    }

    /// Find a task by id for mutation
    pub fn task_mut(&mut self, id: &TaskId) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| KanbanError::not_found(EntityKind::Task, id))
    }

    /// Position of a task within this column
    pub fn task_index(&self, id: &TaskId) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| KanbanError::not_found(EntityKind::Task, id))
    }
}
