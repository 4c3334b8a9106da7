//! Axum route handlers for the Analysis API.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::analyzer::{analyze_and_store, DEFAULT_JOB_ROLE};
use crate::analysis::models::Analysis;
use crate::analysis::validation::try_validate;
use crate::auth::{require_user_id, UserIdQuery};
use crate::errors::AppError;
use crate::models::resume::{find_owned, ResumeRow, EXTRACTION_FAILED_PREFIX};
use crate::state::AppState;
use crate::upload::pdf::is_analyzable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Pending,
    Completed,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub success: bool,
    pub has_analysis: bool,
    pub analysis: Option<Analysis>,
    pub status: AnalysisStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub user_id: Option<String>,
}

impl AnalysisResponse {
    /// Stored feedback that fails validation is treated as not yet analyzed.
    pub fn from_row(row: &ResumeRow) -> Self {
        let analysis = row.feedback.as_ref().and_then(try_validate);
        AnalysisResponse {
            success: true,
            has_analysis: analysis.is_some(),
            status: if analysis.is_some() {
                AnalysisStatus::Completed
            } else {
                AnalysisStatus::Pending
            },
            analysis,
        }
    }
}

/// Returns the résumé text if it is long enough to analyze. The marker left by
/// a failed extraction never counts as text.
fn analyzable_text(row: &ResumeRow) -> Result<&str, AppError> {
    row.raw_text
        .as_deref()
        .filter(|t| !t.starts_with(EXTRACTION_FAILED_PREFIX) && is_analyzable(t))
        .ok_or_else(|| AppError::Validation("Resume text too short for analysis".to_string()))
}

async fn load_owned(state: &AppState, resume_id: Uuid, user_id: Uuid) -> Result<ResumeRow, AppError> {
    find_owned(&state.db, resume_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))
}

/// GET /api/v1/analyze/:resume_id?user_id=
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let user_id = require_user_id(params.user_id.as_deref())?;
    let row = load_owned(&state, resume_id, user_id).await?;
    Ok(Json(AnalysisResponse::from_row(&row)))
}

/// POST /api/v1/analyze/:resume_id
///
/// Runs analysis synchronously and replaces any stored feedback.
pub async fn handle_trigger_analysis(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let Json(req) = payload?;
    let user_id = require_user_id(req.user_id.as_deref())?;
    let row = load_owned(&state, resume_id, user_id).await?;
    let text = analyzable_text(&row)?;
    let job_role = row.job_role.as_deref().unwrap_or(DEFAULT_JOB_ROLE);

    let analysis =
        analyze_and_store(&state.db, state.analyzer.as_ref(), resume_id, text, job_role).await?;

    Ok(Json(AnalysisResponse {
        success: true,
        has_analysis: true,
        analysis: Some(analysis),
        status: AnalysisStatus::Completed,
    }))
}
