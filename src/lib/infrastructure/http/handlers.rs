//! API handler modules

use std::any::Any;

use axum::{
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
    Json,
};

use super::errors::ErrorResponse;

pub mod v1;

/// Converts a panic inside a handler into a JSON 500 response
pub fn panic_handler(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Internal server error".to_string()
    };

    let error = ErrorResponse { error: details };

    let response = Json(error).into_response();

    (StatusCode::INTERNAL_SERVER_ERROR, response).into_response()
}
