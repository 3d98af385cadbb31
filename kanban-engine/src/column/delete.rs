//! DeleteColumn command

use crate::error::Result;
use crate::ids::{BoardId, ColumnId};
use crate::mutation::{deletion_receipt, Applied, Mutation};
use crate::types::BoardState;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Delete a column and every task in it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteColumn {
    pub board_id: BoardId,
    pub column_id: ColumnId,
}

impl DeleteColumn {
    pub fn new(board_id: impl Into<BoardId>, column_id: impl Into<ColumnId>) -> Self {
        Self {
            board_id: board_id.into(),
            column_id: column_id.into(),
        }
    }
}

impl Mutation for DeleteColumn {
    fn op(&self) -> &'static str {
        "delete column"
    }

    fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    fn apply(&self, state: &BoardState) -> Result<Applied> {
        let index = state.board(&self.board_id)?.column_index(&self.column_id)?;

        let mut next = state.clone();
        let removed = next.board_mut(&self.board_id)?.columns.remove(index);

        debug!(
            board = %self.board_id,
            column = %removed.id,
            tasks = removed.tasks.len(),
            "column deleted"
        );
        Ok(Applied::new(next, deletion_receipt(&removed.id)))
    }
}
