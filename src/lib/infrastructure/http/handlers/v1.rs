//! Version 1 of the API

use axum::{
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{
    domain::notifications::MailService,
    infrastructure::http::{open_api::ApiDocs, state::AppState},
};

pub mod mail;
pub mod uptime;

/// Routes of the version 1 API
pub fn router<M: MailService>() -> Router<AppState<M>> {
    Router::new()
        .route("/openapi.json", get(Json(ApiDocs::openapi())))
        .route("/uptime", get(uptime::handler::<M>))
        .route("/mail", post(mail::handler::<M>))
}
