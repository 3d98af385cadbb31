//! Core types for the kanban engine

mod board;
mod state;
mod task;

// Re-export all types
pub use crate::ids::{BoardId, ColumnId, TaskId};
pub use board::{Board, Column, ColumnState};
pub use state::BoardState;
pub use task::{Priority, Task, TaskFields};
