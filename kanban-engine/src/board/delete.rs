//! DeleteBoard command

use crate::error::Result;
use crate::ids::BoardId;
use crate::mutation::{deletion_receipt, Applied, Mutation};
use crate::types::BoardState;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Delete a board together with all of its columns and tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBoard {
    pub board_id: BoardId,
}

impl DeleteBoard {
    pub fn new(board_id: impl Into<BoardId>) -> Self {
        Self {
            board_id: board_id.into(),
        }
    }
}

impl Mutation for DeleteBoard {
    fn op(&self) -> &'static str {
        "delete board"
    }

    fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    fn apply(&self, state: &BoardState) -> Result<Applied> {
        let index = state.board_index(&self.board_id)?;
        let mut next = state.clone();
        let removed = next.boards.remove(index);

        // The board that slid into the vacated slot takes over, else the new last one
        if next.active_board_id.as_ref() == Some(&removed.id) {
            next.active_board_id = next
                .boards
                .get(index)
                .or_else(|| next.boards.last())
                .map(|b| b.id.clone());
        }

        debug!(
            board = %removed.id,
            columns = removed.columns.len(),
            tasks = removed.task_count(),
            "board deleted"
        );
        Ok(Applied::new(next, deletion_receipt(&removed.id)))
    }
}
