//! Application state module

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};

use crate::domain::notifications::MailService;

/// Global application state
#[derive(Clone)]
pub struct AppState<M: MailService> {
    /// The time the server started
    pub start_time: DateTime<Utc>,

    /// Mail dispatcher
    pub mail: Arc<M>,
}

impl<M: MailService> AppState<M> {
    /// Create a new application state
    pub fn new(mail: M) -> Self {
        Self {
            start_time: Utc::now(),
            mail: Arc::new(mail),
        }
    }
}

impl<M: MailService> fmt::Debug for AppState<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("start_time", &self.start_time)
            .field("mail", &"MailService")
            .finish()
    }
}

#[cfg(test)]
pub mod tests {
    use crate::domain::notifications::tests::MockMailService;

    use super::*;

    pub fn test_state(mail: Option<MockMailService>) -> AppState<MockMailService> {
        AppState::new(mail.unwrap_or_default())
    }
}
