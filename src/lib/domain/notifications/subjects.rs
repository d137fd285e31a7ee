//! Subject line resolution

#[cfg(test)]
use mockall::mock;

use super::Locale;

/// Resolves localized subject lines from a message catalog.
pub trait SubjectResolver: Send + Sync + 'static {
    /// Looks `key` up for `locale`, then for the default locale, and finally
    /// returns `key` itself. Never fails.
    fn resolve_subject(&self, key: &str, locale: &Locale) -> String;
}

#[cfg(test)]
mock! {
    pub SubjectResolver {}

    impl SubjectResolver for SubjectResolver {
        fn resolve_subject(&self, key: &str, locale: &Locale) -> String;
    }
}
