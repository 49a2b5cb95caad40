//! Contracts for the document-extraction collaborator.
//!
//! Text extraction is outside the analyzer's scope: files become plain text
//! before the pipeline sees them. These types define the seam.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Metadata reported by the extraction collaborator alongside the text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub file_name: String,
    pub file_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    pub word_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// The extraction collaborator rejected the file's format.
#[derive(Debug, Clone, Error)]
#[error("unsupported document format: {file_name}")]
pub struct UnsupportedFormatError {
    pub file_name: String,
}

impl UnsupportedFormatError {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

/// Extracted text plus its metadata.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub text: String,
    pub metadata: DocumentMetadata,
}

/// The extraction seam: turn an uploaded file into analyzable text.
pub trait TextExtractor {
    fn extract(&self, file_name: &str, bytes: &[u8])
        -> Result<ExtractedDocument, UnsupportedFormatError>;
}
