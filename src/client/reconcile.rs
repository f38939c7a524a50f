use chrono::Utc;
use taskboard_common::validation::{validate_draft, validate_patch};
use taskboard_common::{Status, Task, TaskDraft, TaskPatch};
use tracing::{debug, warn};
use uuid::Uuid;

use super::local::{LocalBoard, MovePlan, Snapshot};
use super::transport::{BoardApi, ClientError, MoveRequest};

/// Prefix of the temporary id a created task carries until the server answers.
pub const PENDING_PREFIX: &str = "pending-";

/// Transient, user-visible message about a failed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    fn from_error(action: &str, err: &ClientError) -> Self {
        Self {
            message: format!("Could not {}: {}", action, err),
        }
    }
}

/// Optimistic board client.
///
/// Each mutating method applies its outcome to the local replica before the
/// request is sent, then either swaps in the server's canonical task or
/// restores the pre-action snapshot and records a [`Notice`]. Methods take
/// `&mut self`, so a client never has two mutations in flight.
pub struct BoardClient<A> {
    api: A,
    board: LocalBoard,
    notices: Vec<Notice>,
}

impl<A: BoardApi> BoardClient<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            board: LocalBoard::new(),
            notices: Vec::new(),
        }
    }

    pub fn board(&self) -> &LocalBoard {
        &self.board
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drain pending notices, e.g. after they have been shown.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Replace the replica with the server's list.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        match self.api.list().await {
            Ok(tasks) => {
                debug!(count = tasks.len(), "board loaded");
                self.board = LocalBoard::from_tasks(tasks);
                Ok(())
            }
            Err(err) => {
                self.notices.push(Notice::from_error("load the board", &err));
                Err(err)
            }
        }
    }

    pub async fn create(&mut self, draft: TaskDraft) -> Result<Task, ClientError> {
        let errors = validate_draft(&draft);
        if !errors.is_empty() {
            return Err(self.reject("create the task", errors));
        }

        let snapshot = self.board.snapshot();
        let now = Utc::now();
        let placeholder_id = format!("{}{}", PENDING_PREFIX, Uuid::new_v4());
        let position = self.board.tail_position(Status::DEFAULT);
        self.board.upsert(Task {
            id: placeholder_id.clone(),
            title: draft.title.trim().to_string(),
            description: draft.description.clone().unwrap_or_default(),
            status: Status::DEFAULT,
            position,
            created_at: now,
            updated_at: now,
        });

        match self.api.create(&draft).await {
            Ok(task) => {
                self.board.replace(&placeholder_id, task.clone());
                Ok(task)
            }
            Err(err) => Err(self.roll_back(snapshot, "create the task", err)),
        }
    }

    pub async fn edit(&mut self, id: &str, patch: TaskPatch) -> Result<Task, ClientError> {
        let Some(current) = self.board.get(id).cloned() else {
            return Err(ClientError::UnknownTask(id.to_string()));
        };
        let errors = validate_patch(&patch);
        if !errors.is_empty() {
            return Err(self.reject("save the task", errors));
        }

        let snapshot = self.board.snapshot();
        let mut guess = current.clone();
        patch.apply_to(&mut guess);
        // A lane change without a position lands at the destination tail.
        if guess.status != current.status && patch.position.is_none() {
            guess.position = self.board.tail_position(guess.status);
        }
        self.board.upsert(guess);

        match self.api.update(id, &patch).await {
            Ok(task) => {
                self.board.upsert(task.clone());
                Ok(task)
            }
            Err(err) => Err(self.roll_back(snapshot, "save the task", err)),
        }
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), ClientError> {
        let snapshot = self.board.snapshot();
        if self.board.remove(id).is_none() {
            return Err(ClientError::UnknownTask(id.to_string()));
        }

        match self.api.delete(id).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.roll_back(snapshot, "delete the task", err)),
        }
    }

    /// Move `id` to slot `index` of lane `status`.
    ///
    /// The local position is only a guess; the server recomputes it from the
    /// same index against its own view and its answer replaces the guess.
    /// Dropping a task onto its own slot sends nothing.
    pub async fn move_task(
        &mut self,
        id: &str,
        status: Status,
        index: usize,
    ) -> Result<Task, ClientError> {
        let plan = self
            .board
            .plan_move(id, status, index)
            .ok_or_else(|| ClientError::UnknownTask(id.to_string()))?;
        let position = match plan {
            MovePlan::To(position) => position,
            MovePlan::Unchanged => {
                return self
                    .board
                    .get(id)
                    .cloned()
                    .ok_or_else(|| ClientError::UnknownTask(id.to_string()));
            }
        };

        let snapshot = self.board.snapshot();
        self.board.apply_move(id, status, position);

        match self.api.move_to(id, &MoveRequest::to_index(status, index)).await {
            Ok(task) => {
                if task.position != position {
                    debug!(task_id = %id, guess = position, canonical = task.position, "server adjusted move");
                }
                self.board.upsert(task.clone());
                Ok(task)
            }
            Err(err) => Err(self.roll_back(snapshot, "move the task", err)),
        }
    }

    fn reject(&mut self, action: &str, errors: Vec<String>) -> ClientError {
        let err = ClientError::Validation(errors);
        self.notices.push(Notice::from_error(action, &err));
        err
    }

    fn roll_back(&mut self, snapshot: Snapshot, action: &str, err: ClientError) -> ClientError {
        warn!(error = %err, action, "request failed, restoring local board");
        self.board.restore(snapshot);
        self.notices.push(Notice::from_error(action, &err));
        err
    }
}
