//! Error types for notification mail

use lettre::{address::AddressError, error::Error as MessageError};
use thiserror::Error;
use tracing::debug;

use super::EmailAddressError;

/// Errors raised by a [`TemplateRenderer`](super::TemplateRenderer)
#[derive(Debug, Error)]
pub enum RenderError {
    /// No template variant is registered under the name
    #[error("template \"{0}\" not found")]
    TemplateNotFound(String),

    /// Unknown error
    #[error(transparent)]
    UnknownError(#[from] anyhow::Error),
}

/// Errors raised by a [`Mailer`](super::Mailer) while transmitting
#[derive(Debug, Error)]
pub enum MailerError {
    /// An error occurred while sending the email
    #[error("An error occurred while sending the email")]
    SendError,

    /// Invalid email address
    #[error("Invalid email address")]
    InvalidEmail,

    /// Unknown error
    #[error(transparent)]
    UnknownError(anyhow::Error),
}

impl From<anyhow::Error> for MailerError {
    fn from(err: anyhow::Error) -> Self {
        MailerError::UnknownError(err)
    }
}

impl From<AddressError> for MailerError {
    fn from(_err: AddressError) -> Self {
        MailerError::InvalidEmail
    }
}

impl From<MessageError> for MailerError {
    fn from(err: MessageError) -> Self {
        MailerError::UnknownError(err.into())
    }
}

impl From<EmailAddressError> for MailerError {
    fn from(_err: EmailAddressError) -> Self {
        MailerError::InvalidEmail
    }
}

/// Errors surfaced by the synchronous raw mail path
#[derive(Debug, Error)]
pub enum SimpleMailError {
    /// The recipient address is blank or malformed
    #[error("invalid recipient: {0}")]
    InvalidRecipient(#[from] EmailAddressError),

    /// The wrapper template could not be found
    #[error("failed to find template for e-mail")]
    TemplateNotFound,

    /// The wrapper template could not be rendered
    #[error("failed to render e-mail")]
    CouldNotRender(#[source] anyhow::Error),

    /// Transmission failed
    #[error("failed to send e-mail")]
    CouldNotSendEmail(#[source] MailerError),
}

impl From<RenderError> for SimpleMailError {
    fn from(err: RenderError) -> Self {
        debug!("RenderError -> SimpleMailError");

        match err {
            RenderError::TemplateNotFound(_) => SimpleMailError::TemplateNotFound,
            RenderError::UnknownError(e) => SimpleMailError::CouldNotRender(e),
        }
    }
}

impl From<MailerError> for SimpleMailError {
    fn from(err: MailerError) -> Self {
        debug!("MailerError -> SimpleMailError");

        match err {
            MailerError::InvalidEmail => {
                SimpleMailError::InvalidRecipient(EmailAddressError::InvalidEmailAddress)
            }
            other => SimpleMailError::CouldNotSendEmail(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_template_not_found_maps_to_simple_mail_error() {
        let err = SimpleMailError::from(RenderError::TemplateNotFound("mail/x".to_string()));

        assert!(matches!(err, SimpleMailError::TemplateNotFound));
    }

    #[test]
    fn test_send_error_maps_to_could_not_send() {
        let err = SimpleMailError::from(MailerError::SendError);

        assert!(matches!(
            err,
            SimpleMailError::CouldNotSendEmail(MailerError::SendError)
        ));
    }

    #[test]
    fn test_invalid_email_maps_to_invalid_recipient() {
        let err = SimpleMailError::from(MailerError::InvalidEmail);

        assert!(matches!(err, SimpleMailError::InvalidRecipient(_)));
    }

    #[test]
    fn test_render_error_display() {
        let err = RenderError::TemplateNotFound("mail/activationEmail".to_string());

        assert_eq!(err.to_string(), "template \"mail/activationEmail\" not found");

        let err = RenderError::from(anyhow!("boom"));
        assert_eq!(err.to_string(), "boom");
    }
}
