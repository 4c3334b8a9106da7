use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;

/// Caller identity as passed by the client (`?user_id=` on reads).
/// Session handling lives in front of this service.
#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Option<String>,
}

/// Resolves the caller's user id, rejecting missing or malformed values as 401.
pub fn require_user_id(raw: Option<&str>) -> Result<Uuid, AppError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(AppError::Unauthorized)
}
