//! Request body parsing for the task routes.
//!
//! Bodies arrive as raw JSON so that field presence can be checked one field
//! at a time: an absent key is "leave alone", a present key is validated even
//! when it is empty or `null`. Type errors and range errors land in the same
//! list.

use serde_json::{Map, Value};
use taskboard_common::validation::{
    INVALID_POSITION, INVALID_STATUS, TITLE_REQUIRED, check_description, check_position,
    check_title,
};
use taskboard_common::{Status, TaskDraft, TaskPatch};

use super::service::{MoveTarget, Placement};
use crate::errors::BoardError;

pub const NOT_AN_OBJECT: &str = "Request body must be a JSON object.";
pub const TITLE_NOT_STRING: &str = "Title must be a string.";
pub const DESCRIPTION_NOT_STRING: &str = "Description must be a string.";
pub const INVALID_TO_STATUS: &str = "Invalid toStatus.";
pub const INVALID_TO_INDEX: &str = "toIndex must be a non-negative integer.";
pub const INVALID_TO_POSITION: &str = "Invalid toPosition.";
pub const MISSING_PLACEMENT: &str = "Either toIndex or toPosition is required.";
pub const AMBIGUOUS_PLACEMENT: &str = "Provide only one of toIndex or toPosition.";

fn as_object(body: &Value) -> Result<&Map<String, Value>, BoardError> {
    body.as_object()
        .ok_or_else(|| BoardError::validation([NOT_AN_OBJECT]))
}

fn string_field(
    value: &Value,
    type_error: &'static str,
    check: fn(&str) -> Option<&'static str>,
    errors: &mut Vec<String>,
) -> Option<String> {
    match value.as_str() {
        Some(s) => {
            if let Some(err) = check(s) {
                errors.push(err.to_string());
            }
            Some(s.to_string())
        }
        None => {
            errors.push(type_error.to_string());
            None
        }
    }
}

fn status_field(value: &Value, message: &'static str, errors: &mut Vec<String>) -> Option<Status> {
    match value.as_str().and_then(|s| s.parse::<Status>().ok()) {
        Some(status) => Some(status),
        None => {
            errors.push(message.to_string());
            None
        }
    }
}

fn position_field(value: &Value, message: &'static str, errors: &mut Vec<String>) -> Option<f64> {
    match value.as_f64().filter(|p| check_position(*p).is_none()) {
        Some(position) => Some(position),
        None => {
            errors.push(message.to_string());
            None
        }
    }
}

fn finish<T>(value: T, errors: Vec<String>) -> Result<T, BoardError> {
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(BoardError::Validation(errors))
    }
}

/// `{title, description?}`
pub fn parse_create(body: &Value) -> Result<TaskDraft, BoardError> {
    let fields = as_object(body)?;
    let mut errors = Vec::new();

    let title = match fields.get("title") {
        Some(v) => string_field(v, TITLE_NOT_STRING, check_title, &mut errors),
        None => {
            errors.push(TITLE_REQUIRED.to_string());
            None
        }
    };
    let description = fields
        .get("description")
        .and_then(|v| string_field(v, DESCRIPTION_NOT_STRING, check_description, &mut errors));

    finish(
        TaskDraft {
            title: title.unwrap_or_default(),
            description,
        },
        errors,
    )
}

/// Any subset of `{title, description, status, position}`.
pub fn parse_update(body: &Value) -> Result<TaskPatch, BoardError> {
    let fields = as_object(body)?;
    let mut errors = Vec::new();

    let patch = TaskPatch {
        title: fields
            .get("title")
            .and_then(|v| string_field(v, TITLE_NOT_STRING, check_title, &mut errors)),
        description: fields
            .get("description")
            .and_then(|v| string_field(v, DESCRIPTION_NOT_STRING, check_description, &mut errors)),
        status: fields
            .get("status")
            .and_then(|v| status_field(v, INVALID_STATUS, &mut errors)),
        position: fields
            .get("position")
            .and_then(|v| position_field(v, INVALID_POSITION, &mut errors)),
    };
    finish(patch, errors)
}

/// `{toStatus, toIndex}` or `{toStatus, toPosition}`.
pub fn parse_move(body: &Value) -> Result<MoveTarget, BoardError> {
    let fields = as_object(body)?;
    let mut errors = Vec::new();

    let status = match fields.get("toStatus") {
        Some(v) => status_field(v, INVALID_TO_STATUS, &mut errors),
        None => {
            errors.push(INVALID_TO_STATUS.to_string());
            None
        }
    };

    let index = fields.get("toIndex").map(|v| {
        let index = v.as_u64().and_then(|i| usize::try_from(i).ok());
        if index.is_none() {
            errors.push(INVALID_TO_INDEX.to_string());
        }
        index
    });
    let position = fields
        .get("toPosition")
        .map(|v| position_field(v, INVALID_TO_POSITION, &mut errors));

    let placement = match (index, position) {
        (Some(Some(i)), None) => Some(Placement::Index(i)),
        (None, Some(Some(p))) => Some(Placement::Position(p)),
        (None, None) => {
            errors.push(MISSING_PLACEMENT.to_string());
            None
        }
        (Some(_), Some(_)) => {
            errors.push(AMBIGUOUS_PLACEMENT.to_string());
            None
        }
        // Already reported as a type error above.
        _ => None,
    };

    match (status, placement) {
        (Some(status), Some(placement)) if errors.is_empty() => {
            Ok(MoveTarget { status, placement })
        }
        _ => Err(BoardError::Validation(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskboard_common::validation::{DESCRIPTION_LENGTH, TITLE_LENGTH};

    fn errors_of<T: std::fmt::Debug>(result: Result<T, BoardError>) -> Vec<String> {
        match result {
            Err(BoardError::Validation(errors)) => errors,
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn create_minimal() {
        let draft = parse_create(&json!({"title": "Write docs"})).unwrap();
        assert_eq!(draft.title, "Write docs");
        assert_eq!(draft.description, None);
    }

    #[test]
    fn create_missing_title() {
        assert_eq!(errors_of(parse_create(&json!({}))), vec![TITLE_REQUIRED]);
    }

    #[test]
    fn create_collects_every_problem() {
        let body = json!({"title": 42, "description": "d".repeat(10_001)});
        assert_eq!(
            errors_of(parse_create(&body)),
            vec![TITLE_NOT_STRING, DESCRIPTION_LENGTH]
        );
    }

    #[test]
    fn create_null_description_is_present_and_wrong() {
        let body = json!({"title": "Fine title", "description": null});
        assert_eq!(errors_of(parse_create(&body)), vec![DESCRIPTION_NOT_STRING]);
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert_eq!(errors_of(parse_create(&json!([1, 2]))), vec![NOT_AN_OBJECT]);
        assert_eq!(errors_of(parse_update(&json!("x"))), vec![NOT_AN_OBJECT]);
        assert_eq!(errors_of(parse_move(&json!(null))), vec![NOT_AN_OBJECT]);
    }

    #[test]
    fn update_distinguishes_absent_from_empty() {
        let patch = parse_update(&json!({"description": ""})).unwrap();
        assert_eq!(patch.description.as_deref(), Some(""));
        assert_eq!(patch.title, None);
        assert_eq!(patch.status, None);
        assert_eq!(patch.position, None);
    }

    #[test]
    fn update_all_fields() {
        let body = json!({
            "title": "New title",
            "description": "More",
            "status": "IN_QA",
            "position": 12.5
        });
        let patch = parse_update(&body).unwrap();
        assert_eq!(patch.title.as_deref(), Some("New title"));
        assert_eq!(patch.status, Some(Status::InQa));
        assert_eq!(patch.position, Some(12.5));
    }

    #[test]
    fn update_reports_each_bad_field() {
        let body = json!({"title": "x", "status": "ARCHIVED", "position": "high"});
        assert_eq!(
            errors_of(parse_update(&body)),
            vec![TITLE_LENGTH, INVALID_STATUS, INVALID_POSITION]
        );
    }

    #[test]
    fn update_ignores_unknown_keys() {
        let patch = parse_update(&json!({"id": "other", "createdAt": "now"})).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn move_by_index() {
        let target = parse_move(&json!({"toStatus": "TODO", "toIndex": 2})).unwrap();
        assert_eq!(target.status, Status::Todo);
        assert_eq!(target.placement, Placement::Index(2));
    }

    #[test]
    fn move_by_position() {
        let target = parse_move(&json!({"toStatus": "DONE", "toPosition": 15})).unwrap();
        assert_eq!(target.status, Status::Done);
        assert_eq!(target.placement, Placement::Position(15.0));
    }

    #[test]
    fn move_requires_exactly_one_placement() {
        assert_eq!(
            errors_of(parse_move(&json!({"toStatus": "TODO"}))),
            vec![MISSING_PLACEMENT]
        );
        assert_eq!(
            errors_of(parse_move(
                &json!({"toStatus": "TODO", "toIndex": 0, "toPosition": 1.0})
            )),
            vec![AMBIGUOUS_PLACEMENT]
        );
    }

    #[test]
    fn move_reports_status_and_placement_errors_together() {
        let body = json!({"toStatus": "NOPE", "toIndex": -1});
        assert_eq!(
            errors_of(parse_move(&body)),
            vec![INVALID_TO_STATUS, INVALID_TO_INDEX]
        );
        let body = json!({"toPosition": "15"});
        assert_eq!(
            errors_of(parse_move(&body)),
            vec![INVALID_TO_STATUS, INVALID_TO_POSITION]
        );
    }
}
