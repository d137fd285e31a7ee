//! Notification mail: recipients, templates, subjects and the dispatcher that
//! ties them to a transport.

mod context;
mod email_address;
mod locale;
mod mailer;
mod message;
mod pool;
mod recipient;
mod renderer;
mod service;
mod subjects;
mod template_ref;

pub mod errors;

pub use context::MessageContext;
pub use email_address::{EmailAddress, EmailAddressError};
pub use locale::Locale;
pub use mailer::Mailer;
pub use message::OutboundMessage;
pub use pool::{QueueFullPolicy, WorkerPool};
pub use recipient::Recipient;
pub use renderer::TemplateRenderer;
pub use service::{DispatchConfig, MailService, MailServiceImpl};
pub use subjects::SubjectResolver;
pub use template_ref::TemplateRef;
