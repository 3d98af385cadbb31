//! Kanban board state engine
//!
//! This crate holds the authoritative board/column/task state, the mutations
//! that keep it consistent, durable JSON persistence and a dispatcher that
//! commits mutations after a simulated round trip while keeping callers
//! optimistic.
//!
//! ## Overview
//!
//! - **Snapshots** - [`BoardState`] is an immutable value; every mutation
//!   produces a new one or fails leaving the input untouched
//! - **Command per mutation** - Each operation is a struct implementing
//!   [`Mutation`], grouped by noun (`board`, `column`, `task`)
//! - **Single label source** - [`ColumnState`] is the only list of column
//!   titles, carrying the icon and color the UI shows for each
//! - **Per-board FIFO** - [`Dispatcher`] commits mutations on the same board
//!   in the order they were issued
//!
//! ## Basic Usage
//!
//! ```rust
//! use kanban_engine::{
//!     board::AddBoard, column::AddColumn, task::AddTask, BoardState, Mutation, TaskFields,
//! };
//!
//! # fn example() -> kanban_engine::Result<()> {
//! let board = AddBoard::new("Sprint 1");
//! let state = board.apply(&BoardState::empty())?.state;
//!
//! let column = AddColumn::new(&board.id, "Review");
//! let state = column.apply(&state)?.state;
//!
//! let task = AddTask::new(
//!     &board.id,
//!     &column.id,
//!     TaskFields::from_form("Fix bug", "", "high", "infra, urgent")?,
//! );
//! let applied = task.apply(&state)?;
//! assert_eq!(applied.value["tags"], serde_json::json!(["infra", "urgent"]));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Persisted Document
//!
//! ```text
//! {
//!   "boards": [
//!     { "id": "...", "name": "...",
//!       "columns": [
//!         { "id": "...", "title": "Backlog",
//!           "tasks": [
//!             { "id": "...", "title": "...", "description": "...",
//!               "priority": "medium", "tags": ["..."] } ] } ] } ],
//!   "activeBoardId": "..."
//! }
//! ```
//!
//! Back-references from tasks and columns to their containers are not
//! stored; they are restored from containment when the document is loaded.

pub mod config;
pub mod dispatcher;
mod error;
pub mod ids;
mod mutation;
pub mod selectors;
pub mod store;
pub mod tags;
pub mod types;

// Command modules
pub mod board;
pub mod column;
pub mod task;

pub use config::EngineConfig;
pub use dispatcher::{CommitReport, Dispatcher, PendingMutation};
pub use error::{EntityKind, KanbanError, Result};
pub use ids::new_id;
pub use mutation::{Applied, KanbanMutation, Mutation};
pub use store::{load_or_seed, FileStore, MemoryStore, Seed, StateStorage};
pub use types::{
    Board, BoardId, BoardState, Column, ColumnId, ColumnState, Priority, Task, TaskFields, TaskId,
};
