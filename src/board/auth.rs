//! Shared-secret gate for mutating routes.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;

use super::api::{ApiError, SharedState};
use crate::errors::BoardError;

/// Decide whether a request may mutate the board.
///
/// With no configured token (or an empty one) the gate is open. Otherwise the
/// `Authorization` header must carry exactly the token, either as
/// `Bearer <token>` or bare.
pub fn check_token(expected: Option<&str>, authorization: Option<&str>) -> Result<(), BoardError> {
    let Some(expected) = expected.filter(|t| !t.is_empty()) else {
        return Ok(());
    };
    let header = authorization.unwrap_or_default();
    let provided = header.strip_prefix("Bearer ").unwrap_or(header);
    if !provided.is_empty() && provided == expected {
        Ok(())
    } else {
        Err(BoardError::Unauthorized)
    }
}

/// Extractor that runs [`check_token`] against the server's configured token.
/// Add it to a handler's arguments to gate that handler.
pub struct Authorized;

impl FromRequestParts<SharedState> for Authorized {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        check_token(state.api_token.as_deref(), header).map_err(|e| {
            warn!(method = %parts.method, path = %parts.uri.path(), "rejected request without valid token");
            ApiError::from(e)
        })?;
        Ok(Authorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_when_no_token_configured() {
        assert!(check_token(None, None).is_ok());
        assert!(check_token(None, Some("Bearer anything")).is_ok());
        assert!(check_token(Some(""), None).is_ok());
    }

    #[test]
    fn bearer_and_bare_tokens_accepted() {
        assert!(check_token(Some("s3cret"), Some("Bearer s3cret")).is_ok());
        assert!(check_token(Some("s3cret"), Some("s3cret")).is_ok());
    }

    #[test]
    fn wrong_or_missing_token_rejected() {
        for header in [None, Some(""), Some("Bearer "), Some("Bearer nope"), Some("S3CRET")] {
            assert!(
                matches!(check_token(Some("s3cret"), header), Err(BoardError::Unauthorized)),
                "header {:?} should be rejected",
                header
            );
        }
    }

    #[test]
    fn token_must_match_exactly() {
        assert!(check_token(Some("s3cret"), Some("Bearer s3cret ")).is_err());
        assert!(check_token(Some("s3cret"), Some("Bearer s3cre")).is_err());
    }
}
