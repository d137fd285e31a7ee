//! Simple mail handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::notifications::MailService,
    infrastructure::http::{errors::ApiError, state::AppState},
};

/// Send mail request body
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SendMailBody {
    /// The recipient's email address
    #[schema(example = "email@example.com")]
    pub to: String,

    /// The message, inserted into the simple mail template
    #[schema(example = "Buy milk")]
    pub msg: String,
}

/// Send mail response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendMailResponse {
    /// Whether the transport accepted the mail
    #[schema(example = true)]
    pub success: bool,
}

/// Send a simple mail and wait for the transport to accept it
#[utoipa::path(
    post,
    operation_id = "send_mail",
    tag = "Mail",
    path = "/api/v1/mail",
    request_body = SendMailBody,
    responses(
        (status = StatusCode::OK, description = "Mail sent", body = SendMailResponse),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "Unprocessable entity", body = ErrorResponse, example = json!({"error": "Please provide a valid email address"})),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "Mail could not be sent", body = ErrorResponse, example = json!({"error": "Failed to send e-mail"})),
    )
)]
pub async fn handler<M: MailService>(
    State(state): State<AppState<M>>,
    request: Result<Json<SendMailBody>, JsonRejection>,
) -> Result<Json<SendMailResponse>, ApiError> {
    let Json(request) = request?;

    state.mail.send_simple_mail(&request.to, &request.msg).await?;

    Ok(Json(SendMailResponse { success: true }))
}
