//! Task mutation service.
//!
//! Every operation validates its input completely before touching the store,
//! then computes positions with the shared lane arithmetic. The functions are
//! generic over [`TaskStore`] and synchronous; the HTTP layer runs them inside
//! `DbHandle::call`, so one call's read-compute-write never interleaves with
//! another call on the same connection.

use chrono::{DateTime, SubsecRound, Utc};
use taskboard_common::validation::{
    LANE_EXHAUSTED, check_position, validate_draft, validate_patch,
};
use taskboard_common::{
    Status, Task, TaskDraft, TaskPatch, is_strictly_between, position_between,
    rebalanced_positions,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::store::TaskStore;
use crate::errors::BoardError;

/// Where a moved task should land inside its destination lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Slot index in the destination lane, counted with the moved task
    /// removed. Indices past the end mean "append". The server looks up the
    /// neighbors itself.
    Index(usize),
    /// Absolute position chosen by the caller, trusted as-is.
    Position(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveTarget {
    pub status: Status,
    pub placement: Placement,
}

/// Position for `task_id` between `prev` and `next` in `lane`.
///
/// A tie with a neighbor is kept and logged; the lane needs a rebalance. A
/// non-finite result is refused so it never reaches the store.
fn place_in_lane(
    task_id: &str,
    lane: Status,
    prev: Option<f64>,
    next: Option<f64>,
) -> Result<f64, BoardError> {
    let position = position_between(prev, next);
    if !position.is_finite() {
        warn!(
            task_id,
            %lane,
            ?prev,
            ?next,
            position,
            "no finite position left, rebalance this lane"
        );
        return Err(BoardError::validation([LANE_EXHAUSTED]));
    }
    if !is_strictly_between(prev, position, next) {
        warn!(
            task_id,
            %lane,
            ?prev,
            ?next,
            position,
            "lane positions have collapsed, rebalance this lane"
        );
    }
    Ok(position)
}

pub fn create_task<S: TaskStore + ?Sized>(
    store: &S,
    draft: &TaskDraft,
    now: DateTime<Utc>,
) -> Result<Task, BoardError> {
    let errors = validate_draft(draft);
    if !errors.is_empty() {
        return Err(BoardError::Validation(errors));
    }

    // Storage keeps microseconds; the returned task must equal a later read.
    let now = now.trunc_subsecs(6);
    let status = Status::DEFAULT;
    let id = Uuid::new_v4().to_string();
    let tail = store.last_in_lane(status)?;
    let position = place_in_lane(&id, status, tail.map(|t| t.position), None)?;

    let task = Task {
        id,
        title: draft.title.trim().to_string(),
        description: draft.description.clone().unwrap_or_default(),
        status,
        position,
        created_at: now,
        updated_at: now,
    };
    store.insert(&task)?;
    info!(task_id = %task.id, lane = %status, position, "task created");
    Ok(task)
}

pub fn list_tasks<S: TaskStore + ?Sized>(store: &S) -> Result<Vec<Task>, BoardError> {
    Ok(store.find_all_ordered()?)
}

pub fn get_task<S: TaskStore + ?Sized>(store: &S, id: &str) -> Result<Task, BoardError> {
    store
        .find_by_id(id)?
        .ok_or_else(|| BoardError::not_found(id))
}

pub fn update_task<S: TaskStore + ?Sized>(
    store: &S,
    id: &str,
    patch: &TaskPatch,
    now: DateTime<Utc>,
) -> Result<Task, BoardError> {
    let errors = validate_patch(patch);
    if !errors.is_empty() {
        return Err(BoardError::Validation(errors));
    }

    let current = get_task(store, id)?;
    if patch.is_empty() {
        return Ok(current);
    }

    let mut changes = patch.clone();
    if let Some(title) = &changes.title {
        changes.title = Some(title.trim().to_string());
    }
    // A position from the old lane means nothing in the new one.
    if let Some(status) = changes.status {
        if status != current.status && changes.position.is_none() {
            let tail = store.last_in_lane(status)?.map(|t| t.position);
            changes.position = Some(place_in_lane(id, status, tail, None)?);
        }
    }

    let task = store
        .update_fields(id, &changes, now.max(current.updated_at))?
        .ok_or_else(|| BoardError::not_found(id))?;
    info!(task_id = %task.id, lane = %task.status, position = task.position, "task updated");
    Ok(task)
}

pub fn move_task<S: TaskStore + ?Sized>(
    store: &S,
    id: &str,
    target: &MoveTarget,
    now: DateTime<Utc>,
) -> Result<Task, BoardError> {
    if let Placement::Position(position) = target.placement {
        if let Some(err) = check_position(position) {
            return Err(BoardError::validation([err]));
        }
    }

    let current = get_task(store, id)?;
    let position = match target.placement {
        Placement::Position(position) => position,
        Placement::Index(index) => {
            let lane = store.find_by_status_ordered(target.status)?;
            let current_index = lane.iter().position(|t| t.id == current.id);
            let others: Vec<&Task> = lane.iter().filter(|t| t.id != current.id).collect();
            let index = index.min(others.len());

            if current_index == Some(index) {
                debug!(task_id = %current.id, index, "move targets current slot, nothing to do");
                return Ok(current);
            }

            let prev = index.checked_sub(1).map(|i| others[i].position);
            let next = others.get(index).map(|t| t.position);
            place_in_lane(&current.id, target.status, prev, next)?
        }
    };

    let changes = TaskPatch {
        status: Some(target.status),
        position: Some(position),
        ..Default::default()
    };
    let task = store
        .update_fields(id, &changes, now.max(current.updated_at))?
        .ok_or_else(|| BoardError::not_found(id))?;
    info!(
        task_id = %task.id,
        from = %current.status,
        to = %task.status,
        position = task.position,
        "task moved"
    );
    Ok(task)
}

/// Hard delete. Deleting an id twice fails the second time.
pub fn delete_task<S: TaskStore + ?Sized>(store: &S, id: &str) -> Result<(), BoardError> {
    if !store.delete_by_id(id)? {
        return Err(BoardError::not_found(id));
    }
    info!(task_id = %id, "task deleted");
    Ok(())
}

/// Reassign evenly spaced positions across one lane, keeping its order.
///
/// Maintenance only: nothing calls this as a side effect of a normal
/// mutation.
pub fn rebalance_lane<S: TaskStore + ?Sized>(
    store: &S,
    status: Status,
    now: DateTime<Utc>,
) -> Result<Vec<Task>, BoardError> {
    let lane = store.find_by_status_ordered(status)?;
    let stamp = lane
        .iter()
        .map(|t| t.updated_at)
        .fold(now, |latest, ts| latest.max(ts));
    let positions: Vec<(String, f64)> = lane
        .iter()
        .map(|t| t.id.clone())
        .zip(rebalanced_positions(lane.len()))
        .collect();
    let tasks = store.reposition_lane(status, &positions, stamp)?;
    info!(lane = %status, count = tasks.len(), "lane rebalanced");
    Ok(tasks)
}
