//! Recipient address

use std::fmt;

use lettre::Address;
use thiserror::Error;

/// Why a raw recipient could not be turned into an [`EmailAddress`]
#[derive(Debug, Error)]
pub enum EmailAddressError {
    /// Nothing but whitespace was given
    #[error("email is empty")]
    EmptyEmailAddress,

    /// The address does not parse as `user@domain`
    #[error("email is invalid")]
    InvalidEmailAddress,
}

/// A recipient address, parsed once when a message is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailAddress(Address);

impl EmailAddress {
    /// Parses `raw`, ignoring surrounding whitespace.
    pub fn new(raw: &str) -> Result<Self, EmailAddressError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(EmailAddressError::EmptyEmailAddress);
        }

        trimmed
            .parse::<Address>()
            .map(Self)
            .map_err(|_| EmailAddressError::InvalidEmailAddress)
    }

    /// The address as a string slice
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }

    /// The parsed address handed to the transport
    pub fn address(&self) -> &Address {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
