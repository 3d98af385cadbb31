//! AddBoard command

use super::validate_name;
use crate::error::{EntityKind, KanbanError, Result};
use crate::ids::BoardId;
use crate::mutation::{Applied, Mutation};
use crate::types::{Board, BoardState};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Append a new board and make it the active one
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBoard {
    /// Id for the new board, allocated when the command is built
    #[serde(default)]
    pub id: BoardId,
    /// The board name
    pub name: String,
    /// Seed one column per workflow state
    #[serde(default)]
    pub default_columns: bool,
}

impl AddBoard {
    /// Create a new AddBoard command for an empty board
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BoardId::new(),
            name: name.into(),
            default_columns: false,
        }
    }

    /// Seed the board with one column per workflow state
    pub fn with_default_columns(mut self) -> Self {
        self.default_columns = true;
        self
    }
}

impl Mutation for AddBoard {
    fn op(&self) -> &'static str {
        "add board"
    }

    fn board_id(&self) -> &BoardId {
        &self.id
    }

    fn apply(&self, state: &BoardState) -> Result<Applied> {
        let name = validate_name(&self.name)?;
        if state.contains_board(&self.id) {
            return Err(KanbanError::duplicate_id(EntityKind::Board, &self.id));
        }

        let mut board = Board::new(self.id.clone(), name);
        if self.default_columns {
            board.columns = Board::default_columns(&board.id);
        }
        let value = serde_json::to_value(&board)?;

        let mut next = state.clone();
        next.boards.push(board);
        next.active_board_id = Some(self.id.clone());

        debug!(board = %self.id, "board added");
        Ok(Applied::new(next, value))
    }
}
