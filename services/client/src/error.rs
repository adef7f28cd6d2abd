//! Error types for the client registration pipeline

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::repositories::{StoreError, UniqueField};
use crate::validation::ValidationErrors;

/// Everything that can go wrong while registering a client
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Payload is missing fields or has malformed ones
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Email or username is already taken
    #[error("Duplicate {}", field_label(.0))]
    Conflict(Option<UniqueField>),

    /// The store could not be reached or rejected the write
    #[error("Persistence failure: {0}")]
    Persistence(#[source] StoreError),

    /// The body could not be decoded
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The body exceeded the configured limit
    #[error("Request body too large")]
    PayloadTooLarge,

    /// The body is neither JSON, url-encoded nor multipart
    #[error("Unsupported content type: {0}")]
    UnsupportedMediaType(String),

    /// Anything unexpected
    #[error("Internal error: {0}")]
    Internal(String),
}

fn field_label(field: &Option<UniqueField>) -> &'static str {
    match field {
        Some(UniqueField::Email) => "email",
        Some(UniqueField::Username) => "username",
        None => "email or username",
    }
}

impl RegistrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RegistrationError::Validation(_) | RegistrationError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            RegistrationError::Conflict(_) => StatusCode::CONFLICT,
            RegistrationError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RegistrationError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RegistrationError::Persistence(_) | RegistrationError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the caller; store diagnostics stay in the logs
    pub fn public_message(&self) -> String {
        match self {
            RegistrationError::Validation(errors) => format!("Invalid registration: {}", errors),
            RegistrationError::Conflict(field) => {
                format!("A client with this {} already exists", field_label(field))
            }
            RegistrationError::Persistence(_) => {
                "Unable to register client at this time".to_string()
            }
            RegistrationError::BadRequest(message) => message.clone(),
            RegistrationError::PayloadTooLarge => "Request body is too large".to_string(),
            RegistrationError::UnsupportedMediaType(content_type) => {
                format!("Unsupported content type: {}", content_type)
            }
            RegistrationError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl From<StoreError> for RegistrationError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Duplicate(field) => RegistrationError::Conflict(field),
            other => RegistrationError::Persistence(other),
        }
    }
}

impl From<ValidationErrors> for RegistrationError {
    fn from(errors: ValidationErrors) -> Self {
        RegistrationError::Validation(errors)
    }
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Client registration failed: {}", self);
        }

        let body = match &self {
            RegistrationError::Validation(errors) => json!({
                "message": self.public_message(),
                "errors": errors.errors(),
            }),
            _ => json!({ "message": self.public_message() }),
        };

        (status, Json(body)).into_response()
    }
}
