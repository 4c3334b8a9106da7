use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::analysis::analyzer::ResumeAnalyzer;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub config: Config,
    /// Pluggable analyzer. Default: LlmResumeAnalyzer over the single LlmClient.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
}

/// State for router tests. The pool connects lazily, so requests rejected
/// before any query never need a database.
#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use aws_sdk_s3::config::{BehaviorVersion, Region};

    use crate::analysis::analyzer::testing::FixedAnalyzer;

    let config = Config {
        database_url: "postgres://localhost/resumetrack_test".to_string(),
        s3_bucket: "resumes-test".to_string(),
        s3_endpoint: "http://localhost:9000".to_string(),
        aws_access_key_id: "test".to_string(),
        aws_secret_access_key: "test".to_string(),
        openrouter_api_key: "test".to_string(),
        llm_base_url: crate::llm_client::DEFAULT_BASE_URL.to_string(),
        port: 0,
        rust_log: "info".to_string(),
    };
    let db = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .unwrap();
    let s3 = S3Client::from_conf(
        aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build(),
    );

    AppState {
        db,
        s3,
        config,
        analyzer: Arc::new(FixedAnalyzer(Err("not used".to_string()))),
    }
}
