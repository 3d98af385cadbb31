//! DeleteTask command

use crate::error::Result;
use crate::ids::{BoardId, ColumnId, TaskId};
use crate::mutation::{deletion_receipt, Applied, Mutation};
use crate::types::BoardState;
use serde::{Deserialize, Serialize};

/// Remove exactly one task from its column
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTask {
    pub board_id: BoardId,
    pub column_id: ColumnId,
    pub task_id: TaskId,
}

impl DeleteTask {
    pub fn new(
        board_id: impl Into<BoardId>,
        column_id: impl Into<ColumnId>,
        task_id: impl Into<TaskId>,
    ) -> Self {
        Self {
            board_id: board_id.into(),
            column_id: column_id.into(),
            task_id: task_id.into(),
        }
    }
}

impl Mutation for DeleteTask {
    fn op(&self) -> &'static str {
        "delete task"
    }

    fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    fn apply(&self, state: &BoardState) -> Result<Applied> {
        let index = state
            .column(&self.board_id, &self.column_id)?
            .task_index(&self.task_id)?;

        let mut next = state.clone();
        next.board_mut(&self.board_id)?
            .column_mut(&self.column_id)?
            .tasks
            .remove(index);

        Ok(Applied::new(next, deletion_receipt(&self.task_id)))
    }
}
