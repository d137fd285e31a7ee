//! Domain layer

pub mod notifications;
