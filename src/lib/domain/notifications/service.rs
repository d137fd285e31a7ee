//! Mail dispatch service

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

#[cfg(test)]
use mockall::mock;

use super::{
    errors::SimpleMailError, EmailAddress, Locale, Mailer, MessageContext, OutboundMessage,
    QueueFullPolicy, Recipient, SubjectResolver, TemplateRef, TemplateRenderer, WorkerPool,
};

/// Dispatcher settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Sender identity of templated and raw asynchronous mail
    pub from_address: String,

    /// Sender identity of the synchronous simple mail path
    pub raw_sender: String,

    /// Base URL bound as `baseUrl` in every template context
    pub base_url: String,

    /// Subject of simple mail; resolved from the catalog when unset
    pub simple_subject: Option<String>,

    /// Locale used when a recipient's language cannot be resolved
    pub default_locale: Locale,

    /// Number of worker tasks
    pub workers: usize,

    /// Number of jobs that may wait for a worker
    pub queue_capacity: usize,

    /// Behaviour when the queue is full
    pub queue_policy: QueueFullPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            from_address: "noreply@localhost".to_string(),
            raw_sender: "noreply@localhost".to_string(),
            base_url: "http://localhost:3000".to_string(),
            simple_subject: None,
            default_locale: Locale::default(),
            workers: 4,
            queue_capacity: 100,
            queue_policy: QueueFullPolicy::default(),
        }
    }
}

/// Mail dispatch service
///
/// Every method except [`MailService::send_simple_mail`] is fire-and-forget:
/// it returns once the work is queued, and delivery failures are only
/// logged.
#[async_trait]
pub trait MailService: Clone + Send + Sync + 'static {
    /// Queues a pre-rendered message.
    ///
    /// # Arguments
    /// * `to` - The recipient address. A blank address is logged and dropped.
    /// * `subject` - The subject of the email.
    /// * `body` - The body of the email.
    /// * `is_multipart` - Wrap the body in a multipart container.
    /// * `is_html` - Send the body as HTML rather than plain text.
    async fn send_raw(&self, to: &str, subject: &str, body: &str, is_multipart: bool, is_html: bool);

    /// Queues a message rendered from `template` for `recipient`.
    ///
    /// A recipient without an address is a no-op.
    async fn send_from_template(&self, recipient: &Recipient, template: TemplateRef);

    /// Queues the account activation notice.
    async fn send_activation_email(&self, recipient: &Recipient);

    /// Queues the account creation notice.
    async fn send_creation_email(&self, recipient: &Recipient);

    /// Queues the password reset notice.
    async fn send_password_reset_mail(&self, recipient: &Recipient);

    /// Wraps `text` in the simple mail template and sends it on the
    /// caller's task. A blank `to` is logged and nothing is sent.
    ///
    /// # Returns
    /// - [`Ok`] once the transport accepted the message, or when `to` is
    ///   blank.
    /// - [`Err`] containing a [`SimpleMailError`] if the recipient is
    ///   malformed, the template is missing, or transmission fails.
    async fn send_simple_mail(&self, to: &str, text: &str) -> Result<(), SimpleMailError>;

    /// Stops accepting work and waits for queued mail to be handled.
    async fn shutdown(&self);
}

#[cfg(test)]
mock! {
    pub MailService {}

    impl Clone for MailService {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl MailService for MailService {
        async fn send_raw(&self, to: &str, subject: &str, body: &str, is_multipart: bool, is_html: bool);
        async fn send_from_template(&self, recipient: &Recipient, template: TemplateRef);
        async fn send_activation_email(&self, recipient: &Recipient);
        async fn send_creation_email(&self, recipient: &Recipient);
        async fn send_password_reset_mail(&self, recipient: &Recipient);
        async fn send_simple_mail(&self, to: &str, text: &str) -> Result<(), SimpleMailError>;
        async fn shutdown(&self);
    }
}

/// Mail dispatch service implementation
pub struct MailServiceImpl<R, S, M>
where
    R: TemplateRenderer,
    S: SubjectResolver,
    M: Mailer,
{
    pipeline: Arc<Pipeline<R, S, M>>,
    pool: Arc<WorkerPool>,
}

/// The render-then-transmit steps, shared by every queued job.
struct Pipeline<R, S, M> {
    renderer: Arc<R>,
    subjects: Arc<S>,
    mailer: Arc<M>,
    config: DispatchConfig,
}

impl<R, S, M> MailServiceImpl<R, S, M>
where
    R: TemplateRenderer,
    S: SubjectResolver,
    M: Mailer,
{
    /// Creates the service and spawns its worker pool.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(renderer: Arc<R>, subjects: Arc<S>, mailer: Arc<M>, config: DispatchConfig) -> Self {
        let pool = WorkerPool::new(config.workers, config.queue_capacity, config.queue_policy);

        Self {
            pipeline: Arc::new(Pipeline {
                renderer,
                subjects,
                mailer,
                config,
            }),
            pool: Arc::new(pool),
        }
    }
}

impl<R, S, M> Clone for MailServiceImpl<R, S, M>
where
    R: TemplateRenderer,
    S: SubjectResolver,
    M: Mailer,
{
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            pool: self.pool.clone(),
        }
    }
}

impl<R, S, M> fmt::Debug for MailServiceImpl<R, S, M>
where
    R: TemplateRenderer,
    S: SubjectResolver,
    M: Mailer,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailServiceImpl")
            .field("config", &self.pipeline.config)
            .field("pool", &self.pool)
            .finish()
    }
}

impl<R, S, M> Pipeline<R, S, M>
where
    R: TemplateRenderer,
    S: SubjectResolver,
    M: Mailer,
{
    /// Builds and transmits one message. Failures are logged, not returned.
    async fn deliver(&self, to: &str, subject: &str, body: &str, is_multipart: bool, is_html: bool) {
        debug!(is_multipart, is_html, to, subject, body, "Send email");

        let to = match EmailAddress::new(to) {
            Ok(to) => to,
            Err(err) => {
                warn!(to, error = %err, "Email could not be sent to user");
                return;
            }
        };

        let message = OutboundMessage {
            to,
            from: self.config.from_address.clone(),
            subject: subject.to_string(),
            body: body.to_string(),
            is_html,
            is_multipart,
        };

        match self.mailer.send(&message).await {
            Ok(()) => debug!(to = %message.to, "Sent email to user"),
            Err(err) => warn!(to = %message.to, error = %err, "Email could not be sent to user"),
        }
    }

    async fn deliver_template(&self, recipient: &Recipient, template: TemplateRef) {
        let Some(to) = recipient.address() else {
            return;
        };

        let locale = Locale::resolve(recipient.lang_key.as_deref(), &self.config.default_locale);
        let context = MessageContext::for_recipient(recipient, &locale, &self.config.base_url);

        let body = match self.renderer.render(&template, &locale, &context) {
            Ok(body) => body,
            Err(err) => {
                warn!(
                    to,
                    template = template.name,
                    error = %err,
                    "Email could not be rendered for user"
                );
                return;
            }
        };

        let subject = self.subjects.resolve_subject(template.subject_key, &locale);

        self.deliver(to, &subject, &body, false, true).await;
    }
}

#[async_trait]
impl<R, S, M> MailService for MailServiceImpl<R, S, M>
where
    R: TemplateRenderer,
    S: SubjectResolver,
    M: Mailer,
{
    async fn send_raw(&self, to: &str, subject: &str, body: &str, is_multipart: bool, is_html: bool) {
        if to.trim().is_empty() {
            debug!(subject, "Email has no recipient, dropping it");
            return;
        }

        let pipeline = self.pipeline.clone();
        let (to, subject, body) = (to.to_string(), subject.to_string(), body.to_string());

        self.pool
            .submit(async move {
                pipeline
                    .deliver(&to, &subject, &body, is_multipart, is_html)
                    .await;
            })
            .await;
    }

    async fn send_from_template(&self, recipient: &Recipient, template: TemplateRef) {
        if recipient.address().is_none() {
            debug!(login = %recipient.login, "Email doesn't exist for user");
            return;
        }

        let pipeline = self.pipeline.clone();
        let recipient = recipient.clone();

        self.pool
            .submit(async move {
                pipeline.deliver_template(&recipient, template).await;
            })
            .await;
    }

    async fn send_activation_email(&self, recipient: &Recipient) {
        debug!(to = ?recipient.email, "Sending activation email");
        self.send_from_template(recipient, TemplateRef::ACTIVATION)
            .await;
    }

    async fn send_creation_email(&self, recipient: &Recipient) {
        debug!(to = ?recipient.email, "Sending creation email");
        self.send_from_template(recipient, TemplateRef::CREATION).await;
    }

    async fn send_password_reset_mail(&self, recipient: &Recipient) {
        debug!(to = ?recipient.email, "Sending password reset email");
        self.send_from_template(recipient, TemplateRef::PASSWORD_RESET)
            .await;
    }

    async fn send_simple_mail(&self, to: &str, text: &str) -> Result<(), SimpleMailError> {
        let pipeline = &self.pipeline;
        let config = &pipeline.config;

        if to.trim().is_empty() {
            debug!("Simple email has no recipient, dropping it");
            return Ok(());
        }

        let to = EmailAddress::new(to)?;
        let locale = &config.default_locale;
        let context = MessageContext::new(
            locale,
            [("body".to_string(), Value::String(text.to_string()))],
        );

        let body = pipeline
            .renderer
            .render(&TemplateRef::SIMPLE, locale, &context)?;

        let subject = match &config.simple_subject {
            Some(subject) => subject.clone(),
            None => pipeline
                .subjects
                .resolve_subject(TemplateRef::SIMPLE.subject_key, locale),
        };

        let message = OutboundMessage {
            to,
            from: config.raw_sender.clone(),
            subject,
            body,
            is_html: true,
            is_multipart: false,
        };

        pipeline.mailer.send(&message).await?;

        debug!(to = %message.to, "Sent simple email");

        Ok(())
    }

    async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}
