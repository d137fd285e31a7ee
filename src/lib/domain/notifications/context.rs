//! Rendering context

use serde_json::{Map, Value};

use super::{Locale, Recipient};

const USER: &str = "user";
const BASE_URL: &str = "baseUrl";
const LANG: &str = "lang";

/// Variable bindings available to a template during one render.
///
/// Built once per dispatch and never mutated afterwards. The locale is
/// always bound as `lang` so catalog lookups inside templates follow the
/// recipient's language.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageContext {
    vars: Value,
}

impl MessageContext {
    /// Context for a templated notification: binds `user`, `baseUrl` and
    /// `lang`.
    pub fn for_recipient(recipient: &Recipient, locale: &Locale, base_url: &str) -> Self {
        let user = serde_json::to_value(recipient).unwrap_or(Value::Null);

        Self::new(
            locale,
            [
                (USER.to_string(), user),
                (BASE_URL.to_string(), Value::String(base_url.to_string())),
            ],
        )
    }

    /// Context with arbitrary bindings plus `lang`.
    pub fn new(locale: &Locale, vars: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut map: Map<String, Value> = vars.into_iter().collect();
        map.insert(LANG.to_string(), Value::String(locale.to_string()));

        Self {
            vars: Value::Object(map),
        }
    }

    /// The bindings as a JSON object
    pub fn vars(&self) -> &Value {
        &self.vars
    }
}
