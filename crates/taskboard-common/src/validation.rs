//! Field rules for task input.
//!
//! Every function here collects all violations instead of stopping at the
//! first one, so one round trip reports everything wrong with a request.

use crate::models::{TaskDraft, TaskPatch};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 120;
pub const DESCRIPTION_MAX_CHARS: usize = 10_000;

pub const TITLE_REQUIRED: &str = "Title is required.";
pub const TITLE_LENGTH: &str = "Title must be 3-120 characters.";
pub const DESCRIPTION_LENGTH: &str = "Description must be at most 10,000 characters.";
pub const INVALID_STATUS: &str = "Invalid status.";
pub const INVALID_POSITION: &str = "Position must be a finite number.";
pub const LANE_EXHAUSTED: &str = "No room left in this lane; rebalance it and retry.";

/// Length is counted in characters after trimming surrounding whitespace.
pub fn check_title(title: &str) -> Option<&'static str> {
    let len = title.trim().chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len) {
        return Some(TITLE_LENGTH);
    }
    None
}

pub fn check_description(description: &str) -> Option<&'static str> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Some(DESCRIPTION_LENGTH);
    }
    None
}

pub fn check_position(position: f64) -> Option<&'static str> {
    if !position.is_finite() {
        return Some(INVALID_POSITION);
    }
    None
}

pub fn validate_draft(draft: &TaskDraft) -> Vec<String> {
    let mut errors = Vec::new();
    errors.extend(check_title(&draft.title));
    if let Some(description) = &draft.description {
        errors.extend(check_description(description));
    }
    errors.into_iter().map(String::from).collect()
}

/// Status needs no check here: a typed [`crate::Status`] is always valid.
pub fn validate_patch(patch: &TaskPatch) -> Vec<String> {
    let mut errors = Vec::new();
    if let Some(title) = &patch.title {
        errors.extend(check_title(title));
    }
    if let Some(description) = &patch.description {
        errors.extend(check_description(description));
    }
    if let Some(position) = patch.position {
        errors.extend(check_position(position));
    }
    errors.into_iter().map(String::from).collect()
}
