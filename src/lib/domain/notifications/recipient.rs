//! Notification recipient

use serde::{Deserialize, Serialize};

/// The account a notification is addressed to.
///
/// The whole record is exposed to templates as `user`, so field names are
/// serialized in the camel case the templates use.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    /// Login name
    pub login: String,

    /// First name
    #[serde(default)]
    pub first_name: Option<String>,

    /// Last name
    #[serde(default)]
    pub last_name: Option<String>,

    /// Email address; absent or blank means the recipient cannot be mailed
    #[serde(default)]
    pub email: Option<String>,

    /// Preferred language tag
    #[serde(default)]
    pub lang_key: Option<String>,

    /// Key used by the activation link
    #[serde(default)]
    pub activation_key: Option<String>,

    /// Key used by the password reset link
    #[serde(default)]
    pub reset_key: Option<String>,
}

impl Recipient {
    /// Creates a recipient with a login, address and language tag.
    pub fn new(login: &str, email: &str, lang_key: &str) -> Self {
        Self {
            login: login.to_string(),
            email: Some(email.to_string()),
            lang_key: Some(lang_key.to_string()),
            ..Default::default()
        }
    }

    /// The address to mail, or [`None`] when it is absent or blank.
    pub fn address(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}
