//! SetActiveBoard command

use crate::error::Result;
use crate::ids::BoardId;
use crate::mutation::{Applied, Mutation};
use crate::types::BoardState;
use serde::{Deserialize, Serialize};

/// Make a board the active one
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveBoard {
    pub board_id: BoardId,
}

impl SetActiveBoard {
    pub fn new(board_id: impl Into<BoardId>) -> Self {
        Self {
            board_id: board_id.into(),
        }
    }
}

impl Mutation for SetActiveBoard {
    fn op(&self) -> &'static str {
        "activate board"
    }

    fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    fn apply(&self, state: &BoardState) -> Result<Applied> {
        state.board(&self.board_id)?;
        let mut next = state.clone();
        next.active_board_id = Some(self.board_id.clone());
        Ok(Applied::new(
            next,
            serde_json::json!({"activeBoardId": self.board_id}),
        ))
    }
}
