#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Mail dispatcher server

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mail_dispatcher::{
    domain::notifications::{DispatchConfig, MailService, MailServiceImpl, Mailer},
    infrastructure::{
        config::{MailConfig, MailTransport},
        email::{LogMailer, SMTPConfig, SMTPMailer},
        http::{HttpServer, HttpServerConfig},
        i18n::MessageCatalog,
        templates::HandlebarsRenderer,
    },
};
use tracing::{debug, info};

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The HTTP server configuration
    #[clap(flatten)]
    pub server: HttpServerConfig,

    /// The mail dispatcher configuration
    #[clap(flatten)]
    pub mail: MailConfig,

    /// The SMTP relay configuration
    #[clap(flatten)]
    pub smtp: SMTPConfig,
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded environment"),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => return Err(e).context("failed to load environment"),
    }

    let args = Args::parse();

    let catalog = Arc::new(
        MessageCatalog::from_dir(&args.mail.i18n_dir, args.mail.default_locale.clone())
            .context("failed to load message catalog")?,
    );
    let renderer = Arc::new(
        HandlebarsRenderer::from_dir(&args.mail.templates_dir, catalog.clone())
            .context("failed to load mail templates")?,
    );

    match args.mail.transport {
        MailTransport::Smtp => {
            let mailer = SMTPMailer::new(args.smtp.clone())?;
            serve(mailer, renderer, catalog, args).await
        }
        MailTransport::Log => serve(LogMailer, renderer, catalog, args).await,
    }
}

/// Serves HTTP until a shutdown signal, then drains queued mail.
#[mutants::skip]
async fn serve<M: Mailer>(
    mailer: M,
    renderer: Arc<HandlebarsRenderer>,
    catalog: Arc<MessageCatalog>,
    args: Args,
) -> Result<()> {
    let mail = MailServiceImpl::new(
        renderer,
        catalog,
        Arc::new(mailer),
        DispatchConfig::from(&args.mail),
    );

    let result = HttpServer::new(mail.clone(), args.server).await?.run().await;

    info!("Waiting for queued mail to be sent");
    mail.shutdown().await;

    result
}
