//! HTTP Server

use std::{
    net::{Ipv4Addr, SocketAddr, TcpListener},
    time::Duration,
};

use anyhow::Context;
use axum::{extract::Request, Router};
use axum_server::Handle;
use clap::Parser;
use handlers::{panic_handler, v1};
use state::AppState;
use tokio::signal;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{debug, warn};

use crate::domain::notifications::MailService;

mod errors;
mod handlers;
mod open_api;
mod state;

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
pub struct HttpServerConfig {
    /// The port to listen on
    #[arg(long = "http-port", env = "HTTP_PORT", default_value = "3000")]
    pub port: u16,
}

/// The application's HTTP server
#[derive(Debug)]
pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub async fn new(mail_service: impl MailService, config: HttpServerConfig) -> anyhow::Result<Self> {
        let router = router(AppState::new(mail_service));

        let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
        let listener = TcpListener::bind(address)
            .with_context(|| format!("failed to listen on {}", config.port))?;
        listener
            .set_nonblocking(true)
            .context("failed to make listener non-blocking")?;

        Ok(Self { router, listener })
    }

    /// Runs the HTTP server until Ctrl+C or SIGTERM.
    #[mutants::skip]
    pub async fn run(self) -> anyhow::Result<()> {
        debug!(
            "listening on {}",
            self.listener
                .local_addr()
                .context("failed to get local address")?
        );

        let handle = Handle::new();
        tokio::spawn(shutdown_signal(handle.clone()));

        axum_server::from_tcp(self.listener)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await
            .context("server error")?;

        Ok(())
    }
}

/// Create the application's router
pub fn router<M: MailService>(state: AppState<M>) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        let uri = request.uri().to_string();
        tracing::info_span!("http_request", method = ?request.method(), uri)
    });

    Router::new()
        .nest("/api/v1", v1::router())
        .layer(CatchPanicLayer::custom(panic_handler))
        .layer(trace_layer)
        .with_state(state)
}

#[mutants::skip]
async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    debug!("shutting down gracefully");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
