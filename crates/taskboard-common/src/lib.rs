//! Types shared by the task board server and its client.
//!
//! The server and the client must agree on two things byte for byte: the shape
//! of a [`Task`] on the wire, and the arithmetic used to place a task between
//! two neighbors. Both live here so neither side can drift.

pub mod models;
pub mod position;
pub mod validation;

pub use models::{Status, Task, TaskDraft, TaskPatch};
pub use position::{
    REBALANCE_STRIDE, SEED_POSITION, is_strictly_between, position_between, rebalanced_positions,
};
