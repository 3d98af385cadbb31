//! UpdateTask command

use crate::error::Result;
use crate::ids::{BoardId, ColumnId, TaskId};
use crate::mutation::{Applied, Mutation};
use crate::types::{BoardState, TaskFields};
use serde::{Deserialize, Serialize};

/// Replace the editable fields of a task.
///
/// The submitted fields replace title, description, priority and tags
/// wholesale; the task stays in its column at its position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    pub board_id: BoardId,
    pub column_id: ColumnId,
    pub task_id: TaskId,
    pub fields: TaskFields,
}

impl UpdateTask {
    pub fn new(
        board_id: impl Into<BoardId>,
        column_id: impl Into<ColumnId>,
        task_id: impl Into<TaskId>,
        fields: TaskFields,
    ) -> Self {
        Self {
            board_id: board_id.into(),
            column_id: column_id.into(),
            task_id: task_id.into(),
            fields,
        }
    }
}

impl Mutation for UpdateTask {
    fn op(&self) -> &'static str {
        "update task"
    }

    fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    fn apply(&self, state: &BoardState) -> Result<Applied> {
        let fields = self.fields.validated()?;
        state.task(&self.board_id, &self.column_id, &self.task_id)?;

        let mut next = state.clone();
        let task = next
            .board_mut(&self.board_id)?
            .column_mut(&self.column_id)?
            .task_mut(&self.task_id)?;
        task.apply_fields(fields);
        let value = serde_json::to_value(&*task)?;

        Ok(Applied::new(next, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::test_support::seeded_board;
    use crate::task::AddTask;
    use crate::types::Priority;

    fn with_task() -> (BoardState, AddTask) {
        let (state, board_id) = seeded_board();
        let column_id = state.boards[0].columns[0].id.clone();
        let add = AddTask::new(
            &board_id,
            &column_id,
            TaskFields::new("Original")
                .with_description("first")
                .with_tags(["old"]),
        );
        (add.apply(&state).unwrap().state, add)
    }

    #[test]
    fn test_update_task_replaces_fields() {
        let (state, add) = with_task();
        let applied = UpdateTask::new(
            &add.board_id,
            &add.column_id,
            &add.id,
            TaskFields::new("Updated")
                .with_priority(Priority::Low)
                .with_tag_string("new, shiny"),
        )
        .apply(&state)
        .unwrap();

        let task = applied
            .state
            .task(&add.board_id, &add.column_id, &add.id)
            .unwrap();
        assert_eq!(task.title, "Updated");
        assert_eq!(task.description, "");
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.tags, vec!["new", "shiny"]);
        assert_eq!(task.column_id, add.column_id);
        assert_eq!(applied.value["title"], "Updated");
    }

    #[test]
    fn test_update_task_keeps_position() {
        let (state, add) = with_task();
        let second = AddTask::new(&add.board_id, &add.column_id, TaskFields::new("Second"));
        let state = second.apply(&state).unwrap().state;

        let applied = UpdateTask::new(&add.board_id, &add.column_id, &add.id, TaskFields::new("X"))
            .apply(&state)
            .unwrap();
        let column = applied.state.column(&add.board_id, &add.column_id).unwrap();
        assert_eq!(column.tasks[0].id, add.id);
        assert_eq!(column.tasks[1].id, second.id);
    }

    #[test]
    fn test_update_task_validation_leaves_state() {
        let (state, add) = with_task();
        let err = UpdateTask::new(&add.board_id, &add.column_id, &add.id, TaskFields::new(" "))
            .apply(&state)
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            state.task(&add.board_id, &add.column_id, &add.id).unwrap().title,
            "Original"
        );
    }

    #[test]
    fn test_update_task_wrong_column_is_not_found() {
        let (state, add) = with_task();
        let other = state.boards[0].columns[1].id.clone();
        let err = UpdateTask::new(&add.board_id, &other, &add.id, TaskFields::new("X"))
            .apply(&state)
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
