//! Log-only mail transport

use async_trait::async_trait;
use tracing::info;

use crate::domain::notifications::{errors::MailerError, Mailer, OutboundMessage};

/// Logs every message instead of sending it. Useful in development.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailerError> {
        info!(
            to = %message.to,
            from = %message.from,
            subject = %message.subject,
            is_html = message.is_html,
            is_multipart = message.is_multipart,
            body = %message.body,
            "Email (not sent)"
        );

        Ok(())
    }
}
