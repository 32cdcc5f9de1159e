use serde::{Serialize, Deserialize};
use http::StatusCode;
use crate::store::StoreError;
use crate::validate::ValidationError;
use crate::ErrorMsg;

/// message returned in place of storage failure details
pub const STORAGE_FAILURE_MSG: &str = "An error occurred while accessing storage, try again";

/// stable, machine-readable error category carried in every error response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    NotFound,
    DuplicateUsername,
    StorageError,
    MethodNotAllowed,
    UnsupportedMediaType,
    PayloadTooLarge,
    /// cross-origin request outside the allowed methods/headers
    Forbidden,
    /// failure outside validation and storage, e.g. an unexpected rejection
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Username not found")]
    NotFound {
        username: String,
    },

    #[error("Duplicate username, try a different username")]
    DuplicateUsername {
        username: String,
    },

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl warp::reject::Reject for Error {}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::ValidationError,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::DuplicateUsername { .. } => ErrorKind::DuplicateUsername,
            Error::Storage(_) => ErrorKind::StorageError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::DuplicateUsername { .. } => StatusCode::CONFLICT,
            Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            Error::Validation(e) => e.field,
            Error::NotFound { .. } | Error::DuplicateUsername { .. } => Some("username"),
            Error::Storage(_) => None,
        }
    }

    /// what the caller gets to see. storage causes stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Error::Storage(_) => STORAGE_FAILURE_MSG.to_string(),
            other => other.to_string(),
        }
    }
}

impl ErrorMsg {
    pub fn new(status: StatusCode, kind: ErrorKind, error: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            kind,
            field: None,
            error: error.into(),
        }
    }
}

impl<'a> From<&'a Error> for ErrorMsg {
    fn from(err: &'a Error) -> Self {
        Self {
            status: err.status().as_u16(),
            kind: err.kind(),
            field: err.field().map(String::from),
            error: err.public_message(),
        }
    }
}
