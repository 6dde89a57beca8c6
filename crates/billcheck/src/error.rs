//! Error types for catalog loading, storage and bill checks.

use serde::Serialize;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Input failed shape validation. User-correctable; nothing is persisted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("invalid request data: {}", describe_fields(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: &str, message: &str) -> Self {
        Self {
            fields: vec![FieldError {
                field: field.to_string(),
                message: message.to_string(),
            }],
        }
    }
}

fn describe_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|e| format!("{} {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failures raised by a [`RecordStore`](crate::storage::RecordStore) backend.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Request-level failures of a bill check.
///
/// Acquisition problems never show up here; they are downgraded to an
/// error-status result and persisted.
#[derive(thiserror::Error, Debug)]
pub enum CheckError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures loading a provider catalog.
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate provider id: {0}")]
    DuplicateId(String),

    #[error("provider with empty id at position {0}")]
    EmptyId(usize),
}

pub type CheckResult<T> = Result<T, CheckError>;
