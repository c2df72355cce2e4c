use std::panic::{self, AssertUnwindSafe};

use super::DecodeError;

/// Extracts the text layer of a PDF.
///
/// Malformed input can panic inside the PDF parser; that is reported as a
/// decoding error for this document only.
pub fn extract_text(bytes: &[u8]) -> Result<String, DecodeError> {
    panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)))
        .map_err(|_| DecodeError::Pdf("PDF parser panicked on malformed input".to_string()))?
        .map_err(|e| DecodeError::Pdf(e.to_string()))
}
