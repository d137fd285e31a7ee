//! SMTP email service implementation

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

use crate::domain::notifications::{errors::MailerError, Mailer, OutboundMessage};

/// SMTP configuration
#[derive(Clone, Default, Debug, Parser)]
pub struct SMTPConfig {
    /// The SMTP host
    #[clap(long = "smtp-host", env = "SMTP_HOST", default_value = "localhost")]
    pub host: String,

    /// The SMTP port
    #[clap(long = "smtp-port", env = "SMTP_PORT", default_value = "587")]
    pub port: u16,

    /// The SMTP username; authentication is skipped when empty
    #[clap(long = "smtp-user", env = "SMTP_USER", default_value = "")]
    pub username: String,

    /// Credential of the mail provider, used as the SMTP password
    #[clap(long = "mail-api-key", env = "MAIL_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Verify the TLS certificate
    #[clap(long = "smtp-verify-tls", env = "SMTP_VERIFY_TLS", default_value = "true")]
    pub verify_tls: bool,

    /// Enable STARTTLS (TLS upgrade on connection) instead of implicit TLS
    #[clap(long = "smtp-starttls", env = "SMTP_STARTTLS", default_value = "true")]
    pub starttls: bool,
}

/// SMTP mailer
#[derive(Clone)]
pub struct SMTPMailer {
    config: SMTPConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SMTPMailer {
    /// Create a new SMTP mailer. No connection is opened until the first
    /// message is sent.
    ///
    /// Must be called from within a Tokio runtime; the connection pool
    /// spawns its maintenance task here.
    pub fn new(config: SMTPConfig) -> Result<Self> {
        let transport = Self::transport(&config)?;

        Ok(Self { config, transport })
    }

    fn transport(config: &SMTPConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let tls = TlsParameters::builder(config.host.clone())
            .dangerous_accept_invalid_certs(!config.verify_tls)
            .build()?;

        let tls = if config.starttls {
            Tls::Required(tls)
        } else {
            Tls::Wrapper(tls)
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(tls);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.api_key.clone(),
            ));
        }

        Ok(builder.build())
    }
}

impl std::fmt::Debug for SMTPMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SMTPMailer")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("username", &self.config.username)
            .finish()
    }
}

/// Converts an [`OutboundMessage`] into a MIME message
fn build_message(message: &OutboundMessage) -> Result<Message, MailerError> {
    let content_type = if message.is_html {
        ContentType::TEXT_HTML
    } else {
        ContentType::TEXT_PLAIN
    };

    let builder = Message::builder()
        .from(message.from.parse()?)
        .to(Mailbox::new(None, message.to.address().clone()))
        .subject(message.subject.clone());

    let part = SinglePart::builder()
        .header(content_type)
        .body(message.body.clone());

    let email = if message.is_multipart {
        builder.multipart(MultiPart::mixed().singlepart(part))?
    } else {
        builder.singlepart(part)?
    };

    Ok(email)
}

#[async_trait]
impl Mailer for SMTPMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailerError> {
        let email = build_message(message)?;

        match self.transport.send(email).await {
            Ok(response) => {
                debug!(to = %message.to, code = %response.code(), "SMTP relay accepted email");
                Ok(())
            }
            Err(e) => Err(MailerError::UnknownError(e.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::domain::notifications::EmailAddress;

    use super::*;

    fn message(is_html: bool, is_multipart: bool) -> TestResult<OutboundMessage> {
        Ok(OutboundMessage {
            to: EmailAddress::new("a@b.com")?,
            from: "noreply@example.com".to_string(),
            subject: "Activation needed".to_string(),
            body: "<p>Hello</p>".to_string(),
            is_html,
            is_multipart,
        })
    }

    fn formatted(email: &Message) -> String {
        String::from_utf8_lossy(&email.formatted()).to_string()
    }

    #[test]
    fn test_build_html_message() -> TestResult {
        let email = build_message(&message(true, false)?)?;
        let raw = formatted(&email);

        assert!(raw.contains("To: a@b.com"));
        assert!(raw.contains("From: noreply@example.com"));
        assert!(raw.contains("Subject: Activation needed"));
        assert!(raw.contains("Content-Type: text/html; charset=utf-8"));
        assert!(!raw.contains("multipart/mixed"));

        Ok(())
    }

    #[test]
    fn test_build_plain_multipart_message() -> TestResult {
        let email = build_message(&message(false, true)?)?;
        let raw = formatted(&email);

        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("Content-Type: text/plain; charset=utf-8"));

        Ok(())
    }

    #[test]
    fn test_build_message_invalid_sender() -> TestResult {
        let mut message = message(true, false)?;
        message.from = "not an address".to_string();

        let result = build_message(&message);

        assert!(matches!(result, Err(MailerError::InvalidEmail)));

        Ok(())
    }

    #[tokio::test]
    async fn test_new_does_not_connect() -> TestResult {
        let mailer = SMTPMailer::new(SMTPConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "apikey".to_string(),
            api_key: "secret".to_string(),
            verify_tls: true,
            starttls: true,
        })?;

        assert!(!format!("{mailer:?}").contains("secret"));

        Ok(())
    }
}
