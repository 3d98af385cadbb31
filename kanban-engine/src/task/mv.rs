//! MoveTask command

use crate::error::Result;
use crate::ids::{BoardId, ColumnId, TaskId};
use crate::mutation::{Applied, Mutation};
use crate::types::BoardState;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Move a task to a position in the same or another column of its board
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTask {
    pub board_id: BoardId,
    pub source_column_id: ColumnId,
    pub dest_column_id: ColumnId,
    pub task_id: TaskId,
    /// Target position in the destination column, clamped to its length
    pub dest_index: usize,
}

impl MoveTask {
    /// Create a new MoveTask command with full position
    pub fn new(
        board_id: impl Into<BoardId>,
        source_column_id: impl Into<ColumnId>,
        dest_column_id: impl Into<ColumnId>,
        task_id: impl Into<TaskId>,
        dest_index: usize,
    ) -> Self {
        Self {
            board_id: board_id.into(),
            source_column_id: source_column_id.into(),
            dest_column_id: dest_column_id.into(),
            task_id: task_id.into(),
            dest_index,
        }
    }

    /// Reorder a task within its own column
    pub fn within(
        board_id: impl Into<BoardId>,
        column_id: impl Into<ColumnId>,
        task_id: impl Into<TaskId>,
        dest_index: usize,
    ) -> Self {
        let column_id = column_id.into();
        Self::new(board_id, column_id.clone(), column_id, task_id, dest_index)
    }

    /// Move a task to the end of another column
    pub fn to_column_end(
        board_id: impl Into<BoardId>,
        source_column_id: impl Into<ColumnId>,
        dest_column_id: impl Into<ColumnId>,
        task_id: impl Into<TaskId>,
    ) -> Self {
        Self::new(board_id, source_column_id, dest_column_id, task_id, usize::MAX)
    }
}

impl Mutation for MoveTask {
    fn op(&self) -> &'static str {
        "move task"
    }

    fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    fn apply(&self, state: &BoardState) -> Result<Applied> {
        let board = state.board(&self.board_id)?;
        let from = board
            .column(&self.source_column_id)?
            .task_index(&self.task_id)?;
        board.column(&self.dest_column_id)?;

        let mut next = state.clone();
        let board = next.board_mut(&self.board_id)?;
        let mut task = board
            .column_mut(&self.source_column_id)?
            .tasks
            .remove(from);
        task.column_id = self.dest_column_id.clone();

        let dest = board.column_mut(&self.dest_column_id)?;
        let to = self.dest_index.min(dest.tasks.len());
        dest.tasks.insert(to, task);

        debug!(
            task = %self.task_id,
            from = %self.source_column_id,
            to = %self.dest_column_id,
            index = to,
            "task moved"
        );
        let value = serde_json::json!({
            "id": self.task_id,
            "columnId": self.dest_column_id,
            "index": to
        });
        Ok(Applied::new(next, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::test_support::seeded_board;
    use crate::task::AddTask;
    use crate::types::TaskFields;

    /// Board with tasks A, B, C in the first column
    fn setup() -> (BoardState, BoardId, Vec<ColumnId>, Vec<TaskId>) {
        let (mut state, board_id) = seeded_board();
        let columns: Vec<_> = state.boards[0].columns.iter().map(|c| c.id.clone()).collect();
        let mut tasks = Vec::new();
        for title in ["A", "B", "C"] {
            let cmd = AddTask::new(&board_id, &columns[0], TaskFields::new(title));
            state = cmd.apply(&state).unwrap().state;
            tasks.push(cmd.id);
        }
        (state, board_id, columns, tasks)
    }

    fn titles(state: &BoardState, column: usize) -> Vec<String> {
        state.boards[0].columns[column]
            .tasks
            .iter()
            .map(|t| t.title.clone())
            .collect()
    }

    #[test]
    fn test_move_task_to_column() {
        let (state, board_id, columns, tasks) = setup();
        let before = state.task(&board_id, &columns[0], &tasks[1]).unwrap().clone();

        let applied = MoveTask::new(&board_id, &columns[0], &columns[2], &tasks[1], 0)
            .apply(&state)
            .unwrap();

        assert_eq!(titles(&applied.state, 0), vec!["A", "C"]);
        assert_eq!(titles(&applied.state, 2), vec!["B"]);
        let moved = applied.state.task(&board_id, &columns[2], &tasks[1]).unwrap();
        assert_eq!(moved.column_id, columns[2]);
        assert_eq!(moved.fields(), before.fields());
        assert_eq!(applied.value["columnId"], columns[2].as_str());
        applied.state.check_integrity().unwrap();
    }

    #[test]
    fn test_move_task_clamps_index() {
        let (state, board_id, columns, tasks) = setup();
        let state = MoveTask::new(&board_id, &columns[0], &columns[1], &tasks[0], 0)
            .apply(&state)
            .unwrap()
            .state;

        let applied = MoveTask::to_column_end(&board_id, &columns[0], &columns[1], &tasks[2])
            .apply(&state)
            .unwrap();
        assert_eq!(titles(&applied.state, 1), vec!["A", "C"]);
        assert_eq!(applied.value["index"], 1);
    }

    #[test]
    fn test_move_within_column_is_reorder() {
        let (state, board_id, columns, tasks) = setup();

        let applied = MoveTask::within(&board_id, &columns[0], &tasks[0], 2)
            .apply(&state)
            .unwrap();
        assert_eq!(titles(&applied.state, 0), vec!["B", "C", "A"]);

        let applied = MoveTask::within(&board_id, &columns[0], &tasks[2], 0)
            .apply(&state)
            .unwrap();
        assert_eq!(titles(&applied.state, 0), vec!["C", "A", "B"]);

        let applied = MoveTask::within(&board_id, &columns[0], &tasks[1], 1)
            .apply(&state)
            .unwrap();
        assert_eq!(applied.state, state);
    }

    #[test]
    fn test_move_task_invalid_ids() {
        let (state, board_id, columns, tasks) = setup();

        let err = MoveTask::new(&board_id, &columns[0], "nonexistent", &tasks[0], 0)
            .apply(&state)
            .unwrap_err();
        assert!(err.is_not_found());

        // Task is not in the claimed source column
        let err = MoveTask::new(&board_id, &columns[1], &columns[2], &tasks[0], 0)
            .apply(&state)
            .unwrap_err();
        assert!(err.is_not_found());

        let err = MoveTask::new("missing", &columns[0], &columns[1], &tasks[0], 0)
            .apply(&state)
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
