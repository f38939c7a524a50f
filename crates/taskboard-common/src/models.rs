use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lane a task belongs to. Declaration order is board order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Backlog,
    Todo,
    InProgress,
    InQa,
    ReadyForLive,
    Done,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Backlog,
        Status::Todo,
        Status::InProgress,
        Status::InQa,
        Status::ReadyForLive,
        Status::Done,
    ];

    /// Lane every new task starts in.
    pub const DEFAULT: Status = Status::Backlog;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "BACKLOG",
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::InQa => "IN_QA",
            Self::ReadyForLive => "READY_FOR_LIVE",
            Self::Done => "DONE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::Todo => "Todo",
            Self::InProgress => "In Progress",
            Self::InQa => "In QA",
            Self::ReadyForLive => "Ready for Live",
            Self::Done => "Done",
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BACKLOG" => Ok(Self::Backlog),
            "TODO" => Ok(Self::Todo),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "IN_QA" => Ok(Self::InQa),
            "READY_FOR_LIVE" => Ok(Self::ReadyForLive),
            "DONE" => Ok(Self::Done),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Status,
    pub position: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Order inside one lane: position, then id so equal positions still sort
    /// the same way on every reader.
    pub fn lane_order(a: &Task, b: &Task) -> Ordering {
        a.position
            .total_cmp(&b.position)
            .then_with(|| a.id.cmp(&b.id))
    }

    /// Order across the whole board: lane first, then [`Task::lane_order`].
    pub fn board_order(a: &Task, b: &Task) -> Ordering {
        a.status
            .cmp(&b.status)
            .then_with(|| Self::lane_order(a, b))
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update. `None` means the field was absent from the request and is
/// left untouched; an empty string is a present value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.position.is_none()
    }

    /// Apply the present fields to `task` in place. Title is trimmed the same
    /// way the server stores it.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(position) = self.position {
            task.position = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, status: Status, position: f64) -> Task {
        let now = Utc::now();
        Task {
            id: id.to_string(),
            title: format!("task {}", id),
            description: String::new(),
            status,
            position,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in Status::ALL {
            assert_eq!(Status::from_str(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn status_rejects_unknown_and_lowercase() {
        assert!(Status::from_str("ARCHIVED").is_err());
        assert!(Status::from_str("todo").is_err());
    }

    #[test]
    fn status_default_is_backlog() {
        assert_eq!(Status::default(), Status::Backlog);
    }

    #[test]
    fn task_serializes_camel_case_with_screaming_status() {
        let t = task("a", Status::ReadyForLive, 1000.0);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["status"], "READY_FOR_LIVE");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["position"], 1000.0);
    }

    #[test]
    fn board_order_sorts_by_lane_then_position_then_id() {
        let mut tasks = vec![
            task("c", Status::Todo, 5.0),
            task("b", Status::Backlog, 20.0),
            task("z", Status::Todo, 5.0),
            task("a", Status::Backlog, 10.0),
            task("d", Status::Done, -3.0),
        ];
        tasks.sort_by(Task::board_order);
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "z", "d"]);
    }

    #[test]
    fn patch_apply_touches_only_present_fields() {
        let mut t = task("a", Status::Backlog, 1.0);
        t.description = "keep me".to_string();
        let patch = TaskPatch {
            title: Some("  Renamed  ".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut t);
        assert_eq!(t.title, "Renamed");
        assert_eq!(t.description, "keep me");
        assert_eq!(t.status, Status::Backlog);
        assert_eq!(t.position, 1.0);
    }

    #[test]
    fn patch_with_empty_description_clears_it() {
        let mut t = task("a", Status::Backlog, 1.0);
        t.description = "old".to_string();
        TaskPatch {
            description: Some(String::new()),
            ..Default::default()
        }
        .apply_to(&mut t);
        assert_eq!(t.description, "");
    }
}
