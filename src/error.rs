//! # Error Handling
//!
//! This module defines the error types for the server and converts them into
//! HTTP responses.
//!
//! ## Taxonomy
//! - **Malformed input** (400): the request was incomplete or unparseable
//! - **Protocol violations** (400): a ceremony check failed; never retryable with the same input
//! - **Not found** (404): challenge or credential missing; restart from challenge issuance
//! - **Storage failures** (500): transient, safe to retry the whole ceremony
//!
//! Every [`Rejection`] variant belongs to exactly one validation step, so a
//! failed ceremony always names the check that stopped it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Which ceremony produced a rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ceremony {
    Registration,
    Assertion,
}

impl fmt::Display for Ceremony {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ceremony::Registration => f.write_str("Registration"),
            Ceremony::Assertion => f.write_str("Assertion"),
        }
    }
}

/// Reason a ceremony was rejected
///
/// All variants are fail-closed. The consumed challenge is never restored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("client data type is not correct")]
    WrongCeremonyType,

    #[error("challenge not found")]
    ChallengeNotFound,

    #[error("challenge expired")]
    ChallengeExpired,

    #[error("invalid challenge value")]
    ChallengeMismatch,

    #[error("invalid origin")]
    OriginMismatch,

    #[error("relying party id hash does not match")]
    RelyingPartyMismatch,

    #[error("user presence flag not set")]
    UserNotPresent,

    #[error("user verification flag not set")]
    UserNotVerified,

    #[error("credential id longer than 1023 bytes")]
    CredentialIdTooLong,

    #[error("public key is not ES256 on P-256")]
    UnsupportedAlgorithm,

    #[error("credential not found")]
    CredentialNotFound,

    #[error("credential id is already registered")]
    CredentialAlreadyRegistered,

    #[error("signature verification failed")]
    BadSignature,

    #[error("signature counter did not increase, credential may be cloned")]
    PossibleCloning,
}

impl Rejection {
    /// Shorthand for [`Rejection::MalformedInput`]
    pub fn malformed(msg: impl Into<String>) -> Self {
        Rejection::MalformedInput(msg.into())
    }

    /// Stable machine-readable name, returned to clients as `reason`
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::MalformedInput(_) => "MalformedInput",
            Rejection::WrongCeremonyType => "WrongCeremonyType",
            Rejection::ChallengeNotFound => "ChallengeNotFound",
            Rejection::ChallengeExpired => "ChallengeExpired",
            Rejection::ChallengeMismatch => "ChallengeMismatch",
            Rejection::OriginMismatch => "OriginMismatch",
            Rejection::RelyingPartyMismatch => "RelyingPartyMismatch",
            Rejection::UserNotPresent => "UserNotPresent",
            Rejection::UserNotVerified => "UserNotVerified",
            Rejection::CredentialIdTooLong => "CredentialIdTooLong",
            Rejection::UnsupportedAlgorithm => "UnsupportedAlgorithm",
            Rejection::CredentialNotFound => "CredentialNotFound",
            Rejection::CredentialAlreadyRegistered => "CredentialAlreadyRegistered",
            Rejection::BadSignature => "BadSignature",
            Rejection::PossibleCloning => "PossibleCloning",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::ChallengeNotFound
            | Rejection::ChallengeExpired
            | Rejection::CredentialNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Application-wide error type
///
/// The `#[from]` attributes let `?` convert storage and serialization errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Storage failures from the SQLite store
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failures while opening the store
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// JSON serialization/deserialization of stored records
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A ceremony check failed
    #[error("{0} rejected: {1}")]
    Rejected(Ceremony, Rejection),

    /// Not logged in (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Unexpected state that shouldn't normally occur (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// The rejection carried by this error, if it is one
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            AppError::Rejected(_, reason) => Some(reason),
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Rejected(_, reason) => reason.status(),
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert AppError into an HTTP response
///
/// Storage and serialization details are logged, not returned. Rejections
/// carry their reason and ceremony so clients can tell which check failed.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                json!({ "error": "Database error" })
            }
            AppError::Migration(e) => {
                tracing::error!("Migration error: {:?}", e);
                json!({ "error": "Database error" })
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                json!({ "error": "Serialization error" })
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                json!({ "error": "Internal server error" })
            }
            AppError::Rejected(ceremony, reason) => json!({
                "error": self.to_string(),
                "reason": reason.kind(),
                "ceremony": ceremony,
            }),
            AppError::Unauthorized(_) => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
