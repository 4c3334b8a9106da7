use bytes::Bytes;
use thiserror::Error;
use tracing::error;

/// Below this many characters the PDF is assumed to be a scanned image.
const MIN_EXTRACTED_CHARS: usize = 20;

/// Résumés shorter than this are stored but never sent for analysis.
pub const MIN_ANALYZABLE_CHARS: usize = 50;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF file appears to be empty")]
    Empty,

    #[error("Invalid PDF file - file may be corrupted ({0})")]
    Invalid(String),

    #[error("PDF may be image-based. Only {0} characters extracted")]
    LikelyImageBased(usize),
}

/// Extracts trimmed text from an in-memory PDF.
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfError> {
    if bytes.is_empty() {
        return Err(PdfError::Empty);
    }

    let text =
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| PdfError::Invalid(e.to_string()))?;

    check_extracted(text)
}

/// Runs [`extract_text`] on the blocking pool. Parsing is CPU-bound, and a
/// parser panic on a malformed file surfaces as [`PdfError::Invalid`].
pub async fn extract_text_blocking(bytes: Bytes) -> Result<String, PdfError> {
    tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| {
            error!("PDF extraction task failed: {e}");
            PdfError::Invalid("PDF parser aborted".to_string())
        })?
}

fn check_extracted(text: String) -> Result<String, PdfError> {
    let text = text.trim().to_string();
    let chars = text.chars().count();
    if chars < MIN_EXTRACTED_CHARS {
        return Err(PdfError::LikelyImageBased(chars));
    }
    Ok(text)
}

/// Whether extracted text is long enough to be worth an analysis call.
pub fn is_analyzable(text: &str) -> bool {
    text.chars().count() >= MIN_ANALYZABLE_CHARS
}
