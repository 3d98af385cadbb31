//! ReorderColumn command

use crate::error::Result;
use crate::ids::{BoardId, ColumnId};
use crate::mutation::{Applied, Mutation};
use crate::types::BoardState;
use serde::{Deserialize, Serialize};

/// Move a column to a new position within its board
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderColumn {
    pub board_id: BoardId,
    pub column_id: ColumnId,
    /// Target position, clamped to the column list
    pub dest_index: usize,
}

impl ReorderColumn {
    pub fn new(
        board_id: impl Into<BoardId>,
        column_id: impl Into<ColumnId>,
        dest_index: usize,
    ) -> Self {
        Self {
            board_id: board_id.into(),
            column_id: column_id.into(),
            dest_index,
        }
    }
}

impl Mutation for ReorderColumn {
    fn op(&self) -> &'static str {
        "reorder column"
    }

    fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    fn apply(&self, state: &BoardState) -> Result<Applied> {
        let from = state.board(&self.board_id)?.column_index(&self.column_id)?;

        let mut next = state.clone();
        let columns = &mut next.board_mut(&self.board_id)?.columns;
        let column = columns.remove(from);
        let to = self.dest_index.min(columns.len());
        columns.insert(to, column);

        let value = serde_json::json!({"id": self.column_id, "index": to});
        Ok(Applied::new(next, value))
    }
}
