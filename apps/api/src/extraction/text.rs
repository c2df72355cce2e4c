//! DocumentText: the decoded, immutable content of one resume.

use std::fmt;
use std::sync::Arc;

use crate::decoding::DecodeError;

/// Plain text of a single resume. Never empty or whitespace-only.
///
/// Cheap to clone; the underlying buffer is shared so the same text can be
/// handed to blocking model workers without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText(Arc<str>);

impl DocumentText {
    /// Wraps decoded text, rejecting documents with no extractable content.
    pub fn new(raw: impl Into<String>) -> Result<Self, DecodeError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DecodeError::EmptyText);
        }
        Ok(Self(Arc::from(raw)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased copy used by the vocabulary matchers.
    pub fn to_lowercase(&self) -> String {
        self.0.to_lowercase()
    }
}

impl AsRef<str> for DocumentText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalization step between decoding and extraction.
///
/// Currently a pass-through: the extractors see exactly what the decoder
/// produced. Whitespace and encoding cleanup belongs here once needed.
pub fn normalize(raw: String) -> Result<DocumentText, DecodeError> {
    DocumentText::new(raw)
}
