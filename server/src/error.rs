//! Error types for the property service.
//!
//! Three layers, each with its own enum:
//! - `StoreError`: what a `PropertyStore` backend reports.
//! - `CreateError`: the outcome of the retrying create path.
//! - `AppError`: what a handler turns into an HTTP response.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use property_core::MessageBody;
use thiserror::Error;

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with this id already exists. The only retryable condition.
    #[error("duplicate key: property id {id} already exists")]
    DuplicateKey { id: String },

    /// The store could not be reached or the connection failed.
    #[error("store connection error: {message}")]
    Connection { message: String },

    /// The store rejected or failed a query.
    #[error("store query error: {message}")]
    Query { message: String },

    /// A stored document could not be converted to or from a record.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from creating a property.
#[derive(Debug, Error)]
pub enum CreateError {
    /// The payload was rejected before any insert was attempted.
    #[error("{0}")]
    Validation(String),

    /// Every attempt collided with an existing id.
    #[error("failed to create property: id generation exhausted after {attempts} attempts")]
    CreationExhausted { attempts: u32 },

    /// A non-retryable store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CreateError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CreateError::Validation(_) => StatusCode::BAD_REQUEST,
            CreateError::CreationExhausted { .. } | CreateError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Handler-level errors, rendered as `{"message": ...}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Property not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CreateError> for AppError {
    fn from(err: CreateError) -> Self {
        match err {
            CreateError::Validation(message) => AppError::BadRequest(message),
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Unreadable or mistyped request bodies are client errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(MessageBody::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_errors_map_to_status_codes() {
        assert_eq!(
            CreateError::Validation("group is required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CreateError::CreationExhausted { attempts: 3 }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            CreateError::from(StoreError::Connection { message: "down".into() }).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn exhaustion_message_does_not_leak_store_error() {
        let msg = CreateError::CreationExhausted { attempts: 3 }.to_string();
        assert!(msg.contains("3 attempts"));
        assert!(!msg.contains("duplicate key"));
    }

    #[test]
    fn app_error_from_create_error() {
        let err = AppError::from(CreateError::Validation("group is required".into()));
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "group is required"));

        let err = AppError::from(CreateError::CreationExhausted { attempts: 3 });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_renders_fixed_message() {
        let response = AppError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::NotFound.to_string(), "Property not found");
    }
}
