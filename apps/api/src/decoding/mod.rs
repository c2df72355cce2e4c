//! Document decoding: turns `.pdf` and `.docx` files into `DocumentText`.
//!
//! Dispatch is by file extension (case-insensitive). Anything else fails with
//! `UnsupportedFormat` naming the extension, before the file is read.

pub mod docx;
pub mod pdf;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::extraction::text::{normalize, DocumentText};

pub const SUPPORTED_EXTENSIONS: &[&str] = &[".pdf", ".docx"];

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unsupported file format '{extension}' (use .pdf or .docx)")]
    UnsupportedFormat { extension: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Document contains no extractable text")]
    EmptyText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Resolves a format from an extension with or without the leading dot.
    pub fn from_extension(extension: &str) -> Result<Self, DecodeError> {
        let normalized = extension.trim_start_matches('.').to_lowercase();
        match normalized.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            _ => Err(DecodeError::UnsupportedFormat {
                extension: display_extension(extension),
            }),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, DecodeError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }
}

fn display_extension(extension: &str) -> String {
    let bare = extension.trim_start_matches('.');
    if bare.is_empty() {
        "(none)".to_string()
    } else {
        format!(".{bare}")
    }
}

/// Decodes in-memory document bytes of a known format.
pub fn decode_bytes(bytes: &[u8], format: DocumentFormat) -> Result<DocumentText, DecodeError> {
    let raw = match format {
        DocumentFormat::Pdf => pdf::extract_text(bytes)?,
        DocumentFormat::Docx => docx::extract_text(bytes)?,
    };
    debug!("Decoded {:?} document: {} bytes of text", format, raw.len());
    normalize(raw)
}

/// Blocking decode of a file on disk.
pub fn decode_path(path: &Path) -> Result<DocumentText, DecodeError> {
    let format = DocumentFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    decode_bytes(&bytes, format)
}

/// Decodes a file on the blocking pool. Format is checked before any I/O.
pub async fn decode_file(path: PathBuf) -> Result<DocumentText, DecodeError> {
    DocumentFormat::from_path(&path)?;
    tokio::task::spawn_blocking(move || decode_path(&path))
        .await
        .map_err(|e| DecodeError::Io(std::io::Error::other(e)))?
}

/// Async counterpart of [`decode_bytes`] for request handlers.
pub async fn decode_upload(
    bytes: bytes::Bytes,
    format: DocumentFormat,
) -> Result<DocumentText, DecodeError> {
    tokio::task::spawn_blocking(move || decode_bytes(&bytes, format))
        .await
        .map_err(|e| DecodeError::Io(std::io::Error::other(e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_is_unsupported_and_named() {
        let err = decode_path(Path::new("/tmp/resume.txt")).unwrap_err();
        match err {
            DecodeError::UnsupportedFormat { extension } => assert_eq!(extension, ".txt"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_message_names_extension() {
        let err = DocumentFormat::from_extension("odt").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported file format '.odt' (use .pdf or .docx)"
        );
    }

    #[test]
    fn test_missing_extension_is_unsupported() {
        let err = DocumentFormat::from_path(Path::new("resume")).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnsupportedFormat { ref extension } if extension == "(none)"
        ));
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("CV.PDF")).unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_extension(".Docx").unwrap(),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = decode_path(Path::new("/nonexistent/resume.pdf")).unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }

    #[test]
    fn test_corrupt_pdf_is_decoding_error() {
        let err = decode_bytes(b"definitely not a pdf", DocumentFormat::Pdf).unwrap_err();
        assert!(matches!(err, DecodeError::Pdf(_)));
    }

    #[tokio::test]
    async fn test_decode_file_rejects_before_reading() {
        let err = decode_file(PathBuf::from("/nonexistent/resume.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat { .. }));
    }

    #[tokio::test]
    async fn test_decode_file_reads_docx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.docx");
        std::fs::write(
            &path,
            docx::tests::build_docx(&["Jane Doe", "Education:", "BSc CS"]),
        )
        .unwrap();

        let text = decode_file(path).await.unwrap();
        assert_eq!(text.as_str(), "Jane Doe\nEducation:\nBSc CS");
    }
}
