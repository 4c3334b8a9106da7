//! Résumé analyzer: pluggable, trait-based producer of `Analysis` records.
//!
//! Default: `LlmResumeAnalyzer` (one chat completion per résumé).
//! `AppState` holds an `Arc<dyn ResumeAnalyzer>`, so handlers and the
//! background upload task never touch the LLM client directly.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::analysis::models::Analysis;
use crate::analysis::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::LlmClient;

/// Job role assumed when the upload did not name one.
pub const DEFAULT_JOB_ROLE: &str = "Software Developer";

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(&self, resume_text: &str, job_role: &str) -> Result<Analysis, AppError>;
}

pub struct LlmResumeAnalyzer(pub LlmClient);

#[async_trait]
impl ResumeAnalyzer for LlmResumeAnalyzer {
    async fn analyze(&self, resume_text: &str, job_role: &str) -> Result<Analysis, AppError> {
        let prompt = build_analysis_prompt(resume_text, job_role);
        // Deserializing into `Analysis` runs the validator, so malformed
        // model output never reaches the database.
        self.0
            .call_json::<Analysis>(&prompt, ANALYSIS_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))
    }
}

/// Runs the analyzer and stores the result as the résumé's feedback.
pub async fn analyze_and_store(
    pool: &PgPool,
    analyzer: &dyn ResumeAnalyzer,
    resume_id: Uuid,
    resume_text: &str,
    job_role: &str,
) -> Result<Analysis, AppError> {
    let analysis = analyzer.analyze(resume_text, job_role).await?;
    let feedback = serde_json::to_value(&analysis).map_err(anyhow::Error::from)?;

    sqlx::query("UPDATE resumes SET feedback = $1, updated_at = NOW() WHERE id = $2")
        .bind(feedback)
        .bind(resume_id)
        .execute(pool)
        .await?;

    info!(
        "Stored analysis for resume {resume_id} (score {:.1})",
        analysis.score
    );
    Ok(analysis)
}

/// Fire-and-forget wrapper used after upload. Failures are logged only;
/// the résumé simply stays "pending".
pub async fn analyze_in_background(
    pool: PgPool,
    analyzer: std::sync::Arc<dyn ResumeAnalyzer>,
    resume_id: Uuid,
    resume_text: String,
    job_role: String,
) {
    match analyze_and_store(&pool, analyzer.as_ref(), resume_id, &resume_text, &job_role).await {
        Ok(_) => info!("Background analysis completed for resume {resume_id}"),
        Err(e) => error!("Background analysis failed for resume {resume_id}: {e}"),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Analyzer returning a fixed result, for handler tests.
    pub struct FixedAnalyzer(pub Result<Analysis, String>);

    #[async_trait]
    impl ResumeAnalyzer for FixedAnalyzer {
        async fn analyze(&self, _resume_text: &str, _job_role: &str) -> Result<Analysis, AppError> {
            self.0.clone().map_err(AppError::Llm)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FixedAnalyzer;
    use super::*;

    #[tokio::test]
    async fn test_analyzer_trait_object_dispatch() {
        let analysis = Analysis {
            strengths: vec!["Rust".to_string()],
            missing_skills: vec![],
            ats_tips: vec![],
            improvements: vec![],
            score: 8.0,
        };
        let analyzer: Box<dyn ResumeAnalyzer> = Box::new(FixedAnalyzer(Ok(analysis.clone())));
        let result = analyzer.analyze("text", DEFAULT_JOB_ROLE).await.unwrap();
        assert_eq!(result, analysis);
    }

    #[tokio::test]
    async fn test_analyzer_failure_maps_to_llm_error() {
        let analyzer = FixedAnalyzer(Err("timeout".to_string()));
        let err = analyzer.analyze("text", DEFAULT_JOB_ROLE).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(msg) if msg == "timeout"));
    }
}
