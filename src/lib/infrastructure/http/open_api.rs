//! OpenAPI module

use utoipa::OpenApi;

use crate::infrastructure::http::{errors::ErrorResponse, handlers::v1::*};

#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "Mail Dispatcher"),
    paths(mail::handler, uptime::handler),
    components(schemas(
        mail::SendMailBody,
        mail::SendMailResponse,
        uptime::UptimeResponse,
        ErrorResponse,
    ))
)]
pub struct ApiDocs;

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use testresult::TestResult;

    use crate::infrastructure::http::{router, state::tests::test_state};

    #[tokio::test]
    async fn test_openapi_document_lists_routes() -> TestResult {
        let response = TestServer::new(router(test_state(None)))?
            .get("/api/v1/openapi.json")
            .await;

        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();

        assert_eq!(json["info"]["title"], "Mail Dispatcher");
        assert!(json["paths"]["/api/v1/mail"]["post"].is_object());
        assert!(json["paths"]["/api/v1/uptime"]["get"].is_object());

        Ok(())
    }
}
