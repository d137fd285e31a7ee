//! YAML message catalog
//!
//! One file per locale, named after its language tag (`en.yaml`,
//! `pt-br.yaml`). Nested mappings are flattened into dotted keys, so
//!
//! ```yaml
//! email:
//!   activation:
//!     title: Activation needed
//! ```
//!
//! defines `email.activation.title`.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde_yaml::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::notifications::{Locale, SubjectResolver};

/// Errors raised while loading a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A catalog file or directory could not be read
    #[error("failed to read message catalog {path}")]
    Io {
        /// The path that failed
        path: PathBuf,

        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// A catalog file is not valid YAML
    #[error("failed to parse message catalog {path}")]
    Parse {
        /// The path that failed
        path: PathBuf,

        /// The underlying error
        #[source]
        source: serde_yaml::Error,
    },
}

/// Localized messages keyed by locale tag, then by message key.
///
/// Loaded once at start-up and read-only afterwards.
#[derive(Debug, Default)]
pub struct MessageCatalog {
    default_locale: Locale,
    messages: HashMap<String, HashMap<String, String>>,
}

impl MessageCatalog {
    /// An empty catalog
    pub fn new(default_locale: Locale) -> Self {
        Self {
            default_locale,
            messages: HashMap::new(),
        }
    }

    /// Loads every `{tag}.yaml` / `{tag}.yml` file in `dir`.
    pub fn from_dir(dir: impl AsRef<Path>, default_locale: Locale) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let mut catalog = Self::new(default_locale);

        let entries = fs::read_dir(dir).map_err(|source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let path = entry
                .map_err(|source| CatalogError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();

            let is_yaml = matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("yaml" | "yml")
            );
            if !is_yaml {
                continue;
            }

            let Some(locale) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(Locale::parse)
            else {
                warn!(path = %path.display(), "Skipping catalog file not named after a locale");
                continue;
            };

            let source = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;

            catalog
                .add_yaml(&locale, &source)
                .map_err(|source| CatalogError::Parse {
                    path: path.clone(),
                    source,
                })?;

            debug!(path = %path.display(), locale = %locale, "Loaded message catalog");
        }

        Ok(catalog)
    }

    /// Merges the messages of a YAML document into `locale`.
    pub fn add_yaml(&mut self, locale: &Locale, source: &str) -> Result<(), serde_yaml::Error> {
        let document: Value = serde_yaml::from_str(source)?;
        let messages = self.messages.entry(locale.to_string()).or_default();

        flatten(None, &document, messages);

        Ok(())
    }

    /// The locale consulted after a requested locale's own fallbacks
    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    /// Finds `key` for `locale`, its parent tags, or the default locale.
    pub fn lookup(&self, key: &str, locale: &Locale) -> Option<&str> {
        locale
            .lookup_chain(&self.default_locale)
            .into_iter()
            .find_map(|tag| self.messages.get(tag)?.get(key))
            .map(String::as_str)
    }

    /// Finds `key` and substitutes `{0}`, `{1}`, ... with `args`. An unknown
    /// key yields the key itself.
    pub fn message(&self, key: &str, locale: &Locale, args: &[String]) -> String {
        let Some(pattern) = self.lookup(key, locale) else {
            debug!(key, locale = %locale, "No message found for key");
            return key.to_string();
        };

        args.iter()
            .enumerate()
            .fold(pattern.to_string(), |text, (idx, arg)| {
                text.replace(&format!("{{{idx}}}"), arg)
            })
    }
}

impl SubjectResolver for MessageCatalog {
    fn resolve_subject(&self, key: &str, locale: &Locale) -> String {
        self.message(key, locale, &[])
    }
}

fn flatten(prefix: Option<&str>, value: &Value, out: &mut HashMap<String, String>) {
    let join = |key: &str| match prefix {
        Some(prefix) => format!("{prefix}.{key}"),
        None => key.to_string(),
    };

    match value {
        Value::Mapping(mapping) => {
            for (key, value) in mapping {
                let key = match key {
                    Value::String(key) => key.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => continue,
                };
                flatten(Some(&join(&key)), value, out);
            }
        }
        Value::String(text) => {
            if let Some(key) = prefix {
                out.insert(key.to_string(), text.clone());
            }
        }
        Value::Number(n) => {
            if let Some(key) = prefix {
                out.insert(key.to_string(), n.to_string());
            }
        }
        Value::Bool(b) => {
            if let Some(key) = prefix {
                out.insert(key.to_string(), b.to_string());
            }
        }
        _ => {}
    }
}
