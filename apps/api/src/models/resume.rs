use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Marker prefix stored in `raw_text` when PDF extraction failed at upload.
pub const EXTRACTION_FAILED_PREFIX: &str = "TEXT_EXTRACTION_FAILED";

#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_key: String,
    pub raw_text: Option<String>,
    pub job_role: Option<String>,
    /// Analysis JSON exactly as produced by the analyzer. Untrusted on read.
    pub feedback: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fetches a résumé only if it belongs to `user_id`.
pub async fn find_owned(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(resume_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Returns all of a user's résumés, newest first.
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Fields for a freshly uploaded résumé.
pub struct NewResume<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: &'a str,
    pub file_key: &'a str,
    pub raw_text: &'a str,
    pub job_role: &'a str,
}

pub async fn insert(pool: &PgPool, resume: NewResume<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO resumes (id, user_id, file_name, file_key, raw_text, job_role)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(resume.id)
    .bind(resume.user_id)
    .bind(resume.file_name)
    .bind(resume.file_key)
    .bind(resume.raw_text)
    .bind(resume.job_role)
    .execute(pool)
    .await?;
    Ok(())
}
