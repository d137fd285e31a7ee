//! Language tags

use std::fmt;

/// A normalized language tag such as `en` or `pt-br`.
///
/// Tags are lowercased and `_` separators become `-`, so `pt_BR` and
/// `pt-BR` name the same locale.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Locale(String);

impl Locale {
    /// Parses a language tag, returning [`None`] when it is blank or
    /// contains anything other than ASCII alphanumerics and separators.
    pub fn parse(tag: &str) -> Option<Self> {
        let normalized = tag.trim().replace('_', "-").to_ascii_lowercase();

        let valid = !normalized.is_empty()
            && normalized
                .split('-')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()));

        valid.then_some(Self(normalized))
    }

    /// Parses `tag`, falling back to `default` when it cannot be resolved.
    pub fn resolve(tag: Option<&str>, default: &Locale) -> Self {
        tag.and_then(Self::parse).unwrap_or_else(|| default.clone())
    }

    /// The tag itself
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tags to try, most specific first: `pt-br-x` yields `pt-br-x`, `pt-br`,
    /// `pt`.
    pub fn fallbacks(&self) -> Vec<&str> {
        let mut tags = vec![self.0.as_str()];
        let mut rest = self.0.as_str();

        while let Some(idx) = rest.rfind('-') {
            rest = &rest[..idx];
            tags.push(rest);
        }

        tags
    }

    /// Fallback tags followed by those of `default`, without duplicates.
    pub fn lookup_chain<'a>(&'a self, default: &'a Locale) -> Vec<&'a str> {
        let mut chain = self.fallbacks();

        for tag in default.fallbacks() {
            if !chain.contains(&tag) {
                chain.push(tag);
            }
        }

        chain
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
