//! Axum route handlers for résumé upload and listing.

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::analyzer::analyze_in_background;
use crate::analysis::validation::try_validate;
use crate::auth::{require_user_id, UserIdQuery};
use crate::errors::AppError;
use crate::models::resume::{self, NewResume, ResumeRow, EXTRACTION_FAILED_PREFIX};
use crate::state::AppState;
use crate::upload::pdf::{extract_text_blocking, is_analyzable};
use crate::upload::storage::{resume_key, store_pdf};

const PREVIEW_CHARS: usize = 200;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Raw multipart fields, before validation.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file_name: Option<String>,
    pub file: Option<Bytes>,
    pub job_role: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug)]
pub struct ValidatedUpload {
    pub user_id: Uuid,
    pub file_name: String,
    pub file: Bytes,
    pub job_role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub resume_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub text_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    pub id: Uuid,
    pub file_name: String,
    pub job_role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub has_analysis: bool,
    pub score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub success: bool,
    pub resumes: Vec<ResumeSummary>,
}

impl UploadForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "resume" => {
                    form.file_name = field.file_name().map(String::from);
                    form.file = Some(field.bytes().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read uploaded file: {e}"))
                    })?);
                }
                "jobRole" => form.job_role = Some(read_text(field).await?),
                "userId" => form.user_id = Some(read_text(field).await?),
                _ => {}
            }
        }
        Ok(form)
    }

    pub fn validate(self) -> Result<ValidatedUpload, AppError> {
        let user_id = require_user_id(self.user_id.as_deref())?;

        let file = self
            .file
            .ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
        if file.is_empty() {
            return Err(AppError::Validation("File is empty".to_string()));
        }

        let job_role = self
            .job_role
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .ok_or_else(|| AppError::Validation("Job role is required".to_string()))?;

        Ok(ValidatedUpload {
            user_id,
            file_name: self.file_name.unwrap_or_else(|| "resume.pdf".to_string()),
            file,
            job_role,
        })
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid form field: {e}")))
}

/// First 200 characters, with an ellipsis when truncated.
pub fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

impl From<ResumeRow> for ResumeSummary {
    fn from(row: ResumeRow) -> Self {
        let analysis = row.feedback.as_ref().and_then(try_validate);
        ResumeSummary {
            id: row.id,
            file_name: row.file_name,
            job_role: row.job_role,
            created_at: row.created_at,
            has_analysis: analysis.is_some(),
            score: analysis.map(|a| a.score),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/upload
///
/// Stores the PDF, extracts its text and records the résumé. Analysis runs in
/// the background; clients poll GET /api/v1/analyze/:id for the result.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let upload = UploadForm::from_multipart(multipart).await?.validate()?;
    info!(
        "Upload received from user {}: {} ({} bytes)",
        upload.user_id,
        upload.file_name,
        upload.file.len()
    );

    let resume_id = Uuid::new_v4();
    let file_key = resume_key(upload.user_id, resume_id);
    let extracted = extract_text_blocking(upload.file.clone()).await;

    store_pdf(&state.s3, &state.config.s3_bucket, &file_key, upload.file).await?;

    let text = match extracted {
        Ok(text) => text,
        Err(e) => {
            warn!("PDF extraction failed for {}: {e}", upload.file_name);
            let marker = format!("{EXTRACTION_FAILED_PREFIX}: {e}");
            resume::insert(
                &state.db,
                NewResume {
                    id: resume_id,
                    user_id: upload.user_id,
                    file_name: &upload.file_name,
                    file_key: &file_key,
                    raw_text: &marker,
                    job_role: &upload.job_role,
                },
            )
            .await?;
            return Ok(Json(UploadResponse {
                success: false,
                resume_id,
                file_name: None,
                text_length: 0,
                preview: None,
                error: Some(format!("PDF processing failed: {e}")),
            }));
        }
    };

    resume::insert(
        &state.db,
        NewResume {
            id: resume_id,
            user_id: upload.user_id,
            file_name: &upload.file_name,
            file_key: &file_key,
            raw_text: &text,
            job_role: &upload.job_role,
        },
    )
    .await?;
    info!("Saved resume {resume_id} ({} chars)", text.chars().count());

    if is_analyzable(&text) {
        tokio::spawn(analyze_in_background(
            state.db.clone(),
            state.analyzer.clone(),
            resume_id,
            text.clone(),
            upload.job_role.clone(),
        ));
    } else {
        warn!("Resume {resume_id} text too short; skipping background analysis");
    }

    Ok(Json(UploadResponse {
        success: true,
        resume_id,
        text_length: text.chars().count(),
        preview: Some(preview(&text)),
        file_name: Some(upload.file_name),
        error: None,
    }))
}

/// GET /api/v1/resumes?user_id=
///
/// Lists the caller's résumés. Feedback that fails validation is reported as
/// not yet analyzed rather than as an error.
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let user_id = require_user_id(params.user_id.as_deref())?;
    let rows = resume::list_for_user(&state.db, user_id).await?;

    Ok(Json(ResumeListResponse {
        success: true,
        resumes: rows.into_iter().map(ResumeSummary::from).collect(),
    }))
}
