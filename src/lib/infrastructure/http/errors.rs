//! API error-handling module

use std::fmt;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::notifications::{errors::SimpleMailError, EmailAddressError};

/// An error response
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// The error message
    #[schema(example = "Internal server error")]
    pub error: String,
}

/// An error raised in the API
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApiError {
    /// The status code
    #[schema(example = 500, value_type = u16)]
    #[serde(with = "http_serde::status_code")]
    pub status: StatusCode,

    /// The error message
    #[schema(example = "Internal server error")]
    pub message: String,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }

    /// Create a new unprocessable entity error
    pub fn new_422(message: &str) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    /// Create new internal server error
    pub fn new_500(message: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::new_500(&err.to_string())
    }
}

impl From<EmailAddressError> for ApiError {
    fn from(err: EmailAddressError) -> Self {
        match err {
            EmailAddressError::EmptyEmailAddress => {
                ApiError::new_422("Please provide an email address")
            }
            EmailAddressError::InvalidEmailAddress => {
                ApiError::new_422("Please provide a valid email address")
            }
        }
    }
}

impl From<SimpleMailError> for ApiError {
    fn from(err: SimpleMailError) -> Self {
        match err {
            SimpleMailError::InvalidRecipient(err) => err.into(),
            SimpleMailError::TemplateNotFound => {
                ApiError::new_500("Failed to find template for e-mail")
            }
            SimpleMailError::CouldNotRender(e) => {
                warn!(error = %e, "Simple mail could not be rendered");
                ApiError::new_500("Failed to render e-mail")
            }
            SimpleMailError::CouldNotSendEmail(e) => {
                warn!(error = %e, "Simple mail could not be sent");
                ApiError::new_500("Failed to send e-mail")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), &rejection.body_text())
    }
}
