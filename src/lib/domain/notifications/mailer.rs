//! Mail transport

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use super::{errors::MailerError, OutboundMessage};

/// Transport client performing the actual transmission
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send a composed message
    ///
    /// # Arguments
    /// * `message` - The [`OutboundMessage`] to transmit.
    ///
    /// # Returns
    /// A [`Result`] indicating success or a [`MailerError`] describing why
    /// the message could not be delivered.
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailerError>;
}

#[cfg(test)]
mock! {
    pub Mailer {}

    #[async_trait]
    impl Mailer for Mailer {
        async fn send(&self, message: &OutboundMessage) -> Result<(), MailerError>;
    }
}
