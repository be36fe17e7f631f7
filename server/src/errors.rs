use std::fmt;

use rusoto_core::RusotoError;
use rusoto_s3::PutObjectError;
use thiserror::Error;
use uuid::Uuid;

/// The kinds of records a lookup can fail to find.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    Place,
    User,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Place => write!(f, "place"),
            Entity::User => write!(f, "user"),
        }
    }
}

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents an argument that is missing, blank or malformed.
    #[error("{field} {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },

    /// Represents a category key outside the known set.
    #[error("unknown category {0:?}")]
    UnknownCategory(String),

    /// Represents an ID that could not be parsed.
    #[error("invalid ID {0:?}")]
    InvalidId(String),

    /// Represents a reference to a record that does not exist.
    #[error("{0} does not exist")]
    NotFound(Entity),

    /// Represents a registration with an email that is already taken.
    #[error("{email} already exists")]
    AlreadyExists { email: String },

    /// Represents a password that does not match the stored hash.
    #[error("incorrect user or password")]
    IncorrectCredentials,

    /// Represents a request without a bearer token.
    #[error("missing credentials")]
    MissingCredentials,

    /// Represents a bearer token that is malformed or unknown.
    #[error("invalid session")]
    InvalidSession,

    /// Represents a session acting on another user's resources.
    #[error("session user {session} does not match user {user}")]
    Forbidden { session: Uuid, user: Uuid },

    /// Represents an error caused by missing parts in a form submission.
    #[error("Missing parts")]
    PartsMissing,

    /// Represents a form submission that could not be read.
    #[error("Malformed form submission")]
    MalformedFormSubmission,

    /// Represents an upload whose content type is not an image.
    #[error("unsupported media type {content_type:?}")]
    UnsupportedMediaType { content_type: Option<String> },

    /// Represents a failure to hash or verify a password.
    #[error("password hashing failed: {0}")]
    PasswordHashing(String),

    /// Represents a failure to build the public URL of an upload.
    #[error("Failed to generate URL")]
    FailedToGenerateUrl { source: url::ParseError },

    /// Represents a failure to store an upload.
    #[error("Upload failed")]
    UploadFailed { source: RusotoError<PutObjectError> },

    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },
}

impl BackendError {
    pub fn blank(field: &'static str) -> Self {
        BackendError::Validation {
            field,
            reason: "is empty or blank",
        }
    }

    pub fn missing(field: &'static str) -> Self {
        BackendError::Validation {
            field,
            reason: "is missing",
        }
    }

    pub fn not_a_number(field: &'static str) -> Self {
        BackendError::Validation {
            field,
            reason: "is not a finite number",
        }
    }
}
