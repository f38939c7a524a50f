//! The client's transient replica of the board.

use taskboard_common::{Status, Task, position_between};

/// Full copy of the replica, taken before an optimistic change so a failed
/// request can be undone wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot(Vec<Task>);

/// Outcome of planning a move against the local view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovePlan {
    /// The task already sits at that slot.
    Unchanged,
    /// Candidate position in the destination lane.
    To(f64),
}

#[derive(Debug, Clone, Default)]
pub struct LocalBoard {
    tasks: Vec<Task>,
}

impl LocalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks of one lane in display order.
    pub fn lane(&self, status: Status) -> Vec<&Task> {
        let mut lane: Vec<&Task> = self.tasks.iter().filter(|t| t.status == status).collect();
        lane.sort_by(|a, b| Task::lane_order(a, b));
        lane
    }

    /// Position a new task would get at the end of `status`.
    pub fn tail_position(&self, status: Status) -> f64 {
        let last = self.lane(status).last().map(|t| t.position);
        position_between(last, None)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.tasks.clone())
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.tasks = snapshot.0;
    }

    /// Insert `task`, or replace the task with the same id.
    pub fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    /// Swap the entry stored under `id` (a placeholder) for `task`.
    pub fn replace(&mut self, id: &str, task: Task) {
        self.tasks.retain(|t| t.id != id);
        self.upsert(task);
    }

    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    /// Candidate position for moving `id` to slot `index` of `status`, using
    /// the same arithmetic the server uses. The moved task is left out of the
    /// neighbor lookup and `index` is clamped to the lane length.
    ///
    /// Returns `None` when `id` is not in the replica.
    pub fn plan_move(&self, id: &str, status: Status, index: usize) -> Option<MovePlan> {
        self.get(id)?;
        let lane = self.lane(status);
        let current = lane.iter().position(|t| t.id == id);
        let others: Vec<&Task> = lane.into_iter().filter(|t| t.id != id).collect();
        let index = index.min(others.len());
        if current == Some(index) {
            return Some(MovePlan::Unchanged);
        }

        let prev = index.checked_sub(1).map(|i| others[i].position);
        let next = others.get(index).map(|t| t.position);
        Some(MovePlan::To(position_between(prev, next)))
    }

    /// Put `id` in `status` at `position`. Returns `false` for an unknown id.
    pub fn apply_move(&mut self, id: &str, status: Status, position: f64) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.status = status;
                task.position = position;
                true
            }
            None => false,
        }
    }
}
