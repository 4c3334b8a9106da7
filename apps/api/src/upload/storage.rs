use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Object key for an uploaded résumé PDF.
pub fn resume_key(user_id: Uuid, resume_id: Uuid) -> String {
    format!("resumes/{user_id}/{resume_id}.pdf")
}

/// Uploads the original PDF to object storage.
pub async fn store_pdf(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    body: Bytes,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

    info!("Uploaded resume PDF to s3://{bucket}/{key}");
    Ok(())
}
