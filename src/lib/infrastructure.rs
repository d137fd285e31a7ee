//! Infrastructure adapters for the notification domain

pub mod config;
pub mod email;
pub mod http;
pub mod i18n;
pub mod templates;
