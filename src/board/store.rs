//! Storage gateway the mutation service depends on.
//!
//! The store only guarantees identifier uniqueness and single-call atomicity.
//! Lane ordering rules belong to `service`, not here.

use anyhow::Result;
use chrono::{DateTime, Utc};
use taskboard_common::{Status, Task, TaskPatch};

pub trait TaskStore {
    /// Tasks of one lane, ascending by position (ties by id).
    fn find_by_status_ordered(&self, status: Status) -> Result<Vec<Task>>;

    /// Every task, grouped by lane in board order, ascending by position.
    fn find_all_ordered(&self) -> Result<Vec<Task>>;

    /// The task with the highest position in `status`, if any.
    fn last_in_lane(&self, status: Status) -> Result<Option<Task>>;

    fn find_by_id(&self, id: &str) -> Result<Option<Task>>;

    fn insert(&self, task: &Task) -> Result<()>;

    /// Persist the present fields of `changes` and stamp `updated_at`.
    /// Returns `None` when `id` does not resolve.
    fn update_fields(
        &self,
        id: &str,
        changes: &TaskPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Task>>;

    /// Returns whether a row was removed.
    fn delete_by_id(&self, id: &str) -> Result<bool>;

    /// Overwrite positions of several tasks in `status` as one unit.
    /// Only used by the explicit rebalance maintenance pass.
    fn reposition_lane(
        &self,
        status: Status,
        positions: &[(String, f64)],
        updated_at: DateTime<Utc>,
    ) -> Result<Vec<Task>>;
}
