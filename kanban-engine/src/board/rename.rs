//! RenameBoard command

use super::validate_name;
use crate::error::Result;
use crate::ids::BoardId;
use crate::mutation::{Applied, Mutation};
use crate::types::BoardState;
use serde::{Deserialize, Serialize};

/// Change a board's name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameBoard {
    pub board_id: BoardId,
    pub name: String,
}

impl RenameBoard {
    pub fn new(board_id: impl Into<BoardId>, name: impl Into<String>) -> Self {
        Self {
            board_id: board_id.into(),
            name: name.into(),
        }
    }
}

impl Mutation for RenameBoard {
    fn op(&self) -> &'static str {
        "rename board"
    }

    fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    fn apply(&self, state: &BoardState) -> Result<Applied> {
        let name = validate_name(&self.name)?;
        let mut next = state.clone();
        let board = next.board_mut(&self.board_id)?;
        board.name = name;
        let value = serde_json::json!({"id": board.id, "name": board.name});
        Ok(Applied::new(next, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::AddBoard;

    #[test]
    fn test_rename_board() {
        let add = AddBoard::new("Old");
        let state = add.apply(&BoardState::empty()).unwrap().state;

        let applied = RenameBoard::new(&add.id, " New ").apply(&state).unwrap();
        assert_eq!(applied.state.boards[0].name, "New");
        assert_eq!(applied.value["name"], "New");
        assert_eq!(state.boards[0].name, "Old");
    }

    #[test]
    fn test_rename_board_errors() {
        let add = AddBoard::new("Old");
        let state = add.apply(&BoardState::empty()).unwrap().state;

        assert!(RenameBoard::new(&add.id, "")
            .apply(&state)
            .unwrap_err()
            .is_validation());
        assert!(RenameBoard::new("missing", "Name")
            .apply(&state)
            .unwrap_err()
            .is_not_found());
    }
}
