//! Mail configuration

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::domain::notifications::{DispatchConfig, Locale, QueueFullPolicy};

/// Which transport delivers outbound mail
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum MailTransport {
    /// Send through an SMTP relay
    #[default]
    Smtp,

    /// Only log messages
    Log,
}

/// Mail dispatcher configuration
#[derive(Clone, Debug, Parser)]
pub struct MailConfig {
    /// Sender address of simple (raw) mail
    #[clap(long = "mail-host", env = "MAIL_HOST")]
    pub host: String,

    /// Sender address of templated mail
    #[clap(long = "mail-from-address", env = "MAIL_FROM_ADDRESS")]
    pub from_address: String,

    /// Base URL of the application, available to templates as `baseUrl`
    #[clap(long = "mail-base-url", env = "MAIL_BASE_URL")]
    pub base_url: String,

    /// Locale used when a recipient's language is unknown
    #[clap(long = "mail-default-locale", env = "MAIL_DEFAULT_LOCALE", default_value = "en", value_parser = parse_locale)]
    pub default_locale: Locale,

    /// Directory holding the `*.hbs` mail templates
    #[clap(long = "mail-templates-dir", env = "MAIL_TEMPLATES_DIR", default_value = "templates")]
    pub templates_dir: PathBuf,

    /// Directory holding the `{locale}.yaml` message catalogs
    #[clap(long = "mail-i18n-dir", env = "MAIL_I18N_DIR", default_value = "i18n")]
    pub i18n_dir: PathBuf,

    /// Subject of simple mail; taken from the catalog when unset
    #[clap(long = "mail-simple-subject", env = "MAIL_SIMPLE_SUBJECT")]
    pub simple_subject: Option<String>,

    /// Number of background workers sending mail
    #[clap(long = "mail-workers", env = "MAIL_WORKERS", default_value = "4")]
    pub workers: usize,

    /// Number of queued messages allowed to wait for a worker
    #[clap(long = "mail-queue-capacity", env = "MAIL_QUEUE_CAPACITY", default_value = "100")]
    pub queue_capacity: usize,

    /// What to do when the queue is full: `block` or `reject`
    #[clap(long = "mail-queue-policy", env = "MAIL_QUEUE_POLICY", default_value = "block")]
    pub queue_policy: QueueFullPolicy,

    /// Outbound transport
    #[clap(long = "mail-transport", env = "MAIL_TRANSPORT", value_enum, default_value_t = MailTransport::Smtp)]
    pub transport: MailTransport,
}

fn parse_locale(tag: &str) -> Result<Locale, String> {
    Locale::parse(tag).ok_or_else(|| format!("\"{tag}\" is not a language tag"))
}

impl From<&MailConfig> for DispatchConfig {
    fn from(config: &MailConfig) -> Self {
        Self {
            from_address: config.from_address.clone(),
            raw_sender: config.host.clone(),
            base_url: config.base_url.clone(),
            simple_subject: config.simple_subject.clone(),
            default_locale: config.default_locale.clone(),
            workers: config.workers,
            queue_capacity: config.queue_capacity,
            queue_policy: config.queue_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_parse_defaults() -> TestResult {
        let config = MailConfig::try_parse_from([
            "server",
            "--mail-host",
            "mailer@example.com",
            "--mail-from-address",
            "noreply@example.com",
            "--mail-base-url",
            "https://example.com",
        ])?;

        assert_eq!(config.default_locale.as_str(), "en");
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
        assert_eq!(config.i18n_dir, PathBuf::from("i18n"));
        assert_eq!(config.workers, 4);
        assert_eq!(config.queue_capacity, 100);
        assert_eq!(config.queue_policy, QueueFullPolicy::Block);
        assert_eq!(config.transport, MailTransport::Smtp);
        assert!(config.simple_subject.is_none());

        Ok(())
    }

    #[test]
    fn test_dispatch_config_from_mail_config() -> TestResult {
        let config = MailConfig::try_parse_from([
            "server",
            "--mail-host",
            "mailer@example.com",
            "--mail-from-address",
            "noreply@example.com",
            "--mail-base-url",
            "https://example.com",
            "--mail-default-locale",
            "fr_FR",
            "--mail-queue-policy",
            "reject",
            "--mail-transport",
            "log",
        ])?;

        let dispatch = DispatchConfig::from(&config);

        assert_eq!(dispatch.raw_sender, "mailer@example.com");
        assert_eq!(dispatch.from_address, "noreply@example.com");
        assert_eq!(dispatch.base_url, "https://example.com");
        assert_eq!(dispatch.default_locale.as_str(), "fr-fr");
        assert_eq!(dispatch.queue_policy, QueueFullPolicy::Reject);
        assert_eq!(config.transport, MailTransport::Log);

        Ok(())
    }

    #[test]
    fn test_rejects_invalid_locale() {
        let result = MailConfig::try_parse_from([
            "server",
            "--mail-host",
            "mailer@example.com",
            "--mail-from-address",
            "noreply@example.com",
            "--mail-base-url",
            "https://example.com",
            "--mail-default-locale",
            "not a tag",
        ]);

        assert!(result.is_err());
    }
}
