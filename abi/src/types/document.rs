use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DocumentId, Validator, WorkflowError};

/// An exclusive document. Not quantity-limited; requesting one never reserves
/// supply. `file_url` is an opaque reference resolved by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub description: String,
    pub file_url: String,
    pub uploaded_by: String,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    pub description: String,
    pub file_url: String,
    pub uploaded_by: String,
}

impl NewDocument {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        file_url: impl Into<String>,
        uploaded_by: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            file_url: file_url.into(),
            uploaded_by: uploaded_by.into(),
        }
    }
}

impl Validator for NewDocument {
    fn validate(&self) -> Result<(), WorkflowError> {
        if self.title.trim().is_empty() {
            return Err(WorkflowError::InvalidDocument(
                "title is required".to_string(),
            ));
        }

        if self.file_url.trim().is_empty() {
            return Err(WorkflowError::InvalidDocument(
                "file reference is required".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_should_validate() {
        let doc = NewDocument::new("Exam paper", "final", "uploads/exam.pdf", "admin-1");
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn missing_file_reference_should_be_rejected() {
        let doc = NewDocument::new("Exam paper", "", "", "admin-1");
        assert_eq!(
            doc.validate().unwrap_err(),
            WorkflowError::InvalidDocument("file reference is required".to_string())
        );
    }
}
