use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::DocumentCategory;

/// submitter-entered fields accompanying an upload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentFields {
    /// government id numbers entered by the submitter
    pub id_numbers: Vec<String>,
    /// relationship to the borrower, guarantor bundles only
    pub relationship: Option<String>,
}

/// a file handed to the blob store
#[derive(Debug, Clone)]
pub struct DocumentFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// an upload request for one category
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub category: DocumentCategory,
    pub files: Vec<DocumentFile>,
    pub fields: DocumentFields,
}

/// stored document bundle
///
/// At most one bundle exists per category per account; the write fails if
/// one is already present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentBundle {
    pub category: DocumentCategory,
    pub file_urls: Vec<String>,
    pub fields: DocumentFields,
    pub uploaded_at: DateTime<Utc>,
}

impl DocumentBundle {
    pub fn new(
        category: DocumentCategory,
        file_urls: Vec<String>,
        fields: DocumentFields,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            category,
            file_urls,
            fields,
            uploaded_at,
        }
    }
}
