//! AddTask command

use crate::error::{EntityKind, KanbanError, Result};
use crate::ids::{BoardId, ColumnId, TaskId};
use crate::mutation::{Applied, Mutation};
use crate::types::{BoardState, Task, TaskFields};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Append a new task to a column
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTask {
    /// Id for the new task, allocated when the command is built
    #[serde(default)]
    pub id: TaskId,
    pub board_id: BoardId,
    pub column_id: ColumnId,
    /// Title, description, priority and tags as entered
    pub fields: TaskFields,
}

impl AddTask {
    /// Create a new AddTask command
    pub fn new(
        board_id: impl Into<BoardId>,
        column_id: impl Into<ColumnId>,
        fields: TaskFields,
    ) -> Self {
        Self {
            id: TaskId::new(),
            board_id: board_id.into(),
            column_id: column_id.into(),
            fields,
        }
    }
}

impl Mutation for AddTask {
    fn op(&self) -> &'static str {
        "add task"
    }

    fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    fn apply(&self, state: &BoardState) -> Result<Applied> {
        let fields = self.fields.validated()?;
        state.column(&self.board_id, &self.column_id)?;
        if state.contains_task(&self.id) {
            return Err(KanbanError::duplicate_id(EntityKind::Task, &self.id));
        }

        let task = Task::from_fields(
            self.id.clone(),
            fields,
            self.board_id.clone(),
            self.column_id.clone(),
        );
        let value = serde_json::to_value(&task)?;

        let mut next = state.clone();
        next.board_mut(&self.board_id)?
            .column_mut(&self.column_id)?
            .tasks
            .push(task);

        debug!(board = %self.board_id, column = %self.column_id, task = %self.id, "task added");
        Ok(Applied::new(next, value))
    }
}
