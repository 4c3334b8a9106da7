//! Axum route handler for the Comparison API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::models::Analysis;
use crate::analysis::validation::try_validate;
use crate::auth::require_user_id;
use crate::comparison::engine::compare;
use crate::comparison::models::ComparisonResult;
use crate::errors::AppError;
use crate::models::resume::{find_owned, ResumeRow};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub resume_id1: Option<String>,
    pub resume_id2: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeScore {
    pub file_name: String,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub success: bool,
    pub comparison: ComparisonResult,
    pub resume1: ResumeScore,
    pub resume2: ResumeScore,
}

// ────────────────────────────────────────────────────────────────────────────
// Request checks
// ────────────────────────────────────────────────────────────────────────────

/// Both ids must be present and non-blank. Ids that are present but not
/// UUIDs cannot name a stored résumé, so they surface as not found.
fn parse_resume_ids(req: &CompareRequest) -> Result<(Uuid, Uuid), AppError> {
    let present = |id: &Option<String>| {
        id.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };
    let (Some(first), Some(second)) = (present(&req.resume_id1), present(&req.resume_id2)) else {
        return Err(AppError::Validation(
            "Both resume IDs are required".to_string(),
        ));
    };

    match (Uuid::parse_str(&first), Uuid::parse_str(&second)) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        _ => Err(not_found()),
    }
}

fn not_found() -> AppError {
    AppError::NotFound("One or both resumes not found".to_string())
}

/// Validates both stored analyses before they reach the engine.
fn analyses_for_comparison(
    first: &ResumeRow,
    second: &ResumeRow,
) -> Result<(Analysis, Analysis), AppError> {
    let (Some(feedback1), Some(feedback2)) = (&first.feedback, &second.feedback) else {
        return Err(AppError::Validation(
            "Both resumes need to be analyzed first".to_string(),
        ));
    };

    match (try_validate(feedback1), try_validate(feedback2)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(AppError::Validation(
            "Invalid analysis data in one or both resumes".to_string(),
        )),
    }
}

fn build_response(first: &ResumeRow, second: &ResumeRow) -> Result<CompareResponse, AppError> {
    let (before, after) = analyses_for_comparison(first, second)?;
    let comparison = compare(&before, &after);

    Ok(CompareResponse {
        success: true,
        comparison,
        resume1: ResumeScore {
            file_name: first.file_name.clone(),
            score: before.score,
        },
        resume2: ResumeScore {
            file_name: second.file_name.clone(),
            score: after.score,
        },
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/compare
///
/// Compares the analysis of `resumeId1` (before) with `resumeId2` (after).
/// Both résumés must belong to the caller and carry valid analysis data.
pub async fn handle_compare(
    State(state): State<AppState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Result<Json<CompareResponse>, AppError> {
    let Json(req) = payload?;
    let user_id = require_user_id(req.user_id.as_deref())?;
    let (id1, id2) = parse_resume_ids(&req)?;

    let (first, second) = tokio::try_join!(
        find_owned(&state.db, id1, user_id),
        find_owned(&state.db, id2, user_id),
    )?;
    let (Some(first), Some(second)) = (first, second) else {
        return Err(not_found());
    };

    let response = build_response(&first, &second)?;
    info!(
        "Compared resumes {id1} -> {id2}: delta {:+.1}, {} changes",
        response.comparison.score_improvement,
        response.comparison.changes.len()
    );

    Ok(Json(response))
}
