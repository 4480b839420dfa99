/// Error types for debrief-service
use thiserror::Error;
use uuid::Uuid;

use crate::notifier::messages;

/// Failure of a relational store call
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a media upload
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Upload of '{key}' failed: {message}")]
    Upload { key: String, message: String },
}

impl From<s3_utils::S3Error> for BlobError {
    fn from(err: s3_utils::S3Error) -> Self {
        match err {
            s3_utils::S3Error::Request { key, message } => BlobError::Upload { key, message },
        }
    }
}

#[derive(Error, Debug)]
pub enum DebriefError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("A channel must be selected for non-public content")]
    InvalidScope,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(Uuid),

    #[error("Deletion of {0} rejected: not owned by the current viewer or already removed")]
    OwnershipRejected(Uuid),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Media error: {0}")]
    Blob(#[from] BlobError),
}

impl From<validator::ValidationErrors> for DebriefError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DebriefError::InvalidInput(errors.to_string())
    }
}

impl DebriefError {
    /// Errors caught before any store call was issued
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            DebriefError::AuthRequired
                | DebriefError::InvalidScope
                | DebriefError::InvalidInput(_)
                | DebriefError::NotFound(_)
        )
    }

    /// Localized notice for this error; `fallback` names the failed operation.
    pub fn user_message(&self, fallback: &'static str) -> &'static str {
        match self {
            DebriefError::AuthRequired => messages::AUTH_REQUIRED,
            DebriefError::InvalidScope => messages::CHANNEL_REQUIRED,
            DebriefError::InvalidInput(_) => messages::INVALID_INPUT,
            _ => fallback,
        }
    }
}

/// Result type alias for repository operations
pub type DebriefResult<T> = Result<T, DebriefError>;

/// Result type alias for store calls
pub type StoreResult<T> = Result<T, StoreError>;
