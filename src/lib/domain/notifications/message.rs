//! Outbound message

use super::EmailAddress;

/// A fully composed message, ready for a [`Mailer`](super::Mailer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    /// The recipient of the email
    pub to: EmailAddress,

    /// The sender identity, parsed by the transport
    pub from: String,

    /// The subject of the email
    pub subject: String,

    /// The rendered body
    pub body: String,

    /// Whether `body` is HTML rather than plain text
    pub is_html: bool,

    /// Whether the body is wrapped in a multipart container
    pub is_multipart: bool,
}
