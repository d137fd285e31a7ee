//! Handlebars template store
//!
//! Templates are loaded once from a directory tree. Every `*.hbs` file is
//! registered under its relative path without the extension, and locale
//! variants carry the language tag as a suffix:
//!
//! ```text
//! mail/activationEmail.hbs      -> mail/activationEmail
//! mail/activationEmail.fr.hbs   -> mail/activationEmail.fr
//! ```
//!
//! Templates can localize text through the `t` helper, which reads the
//! message catalog for the context's `lang`:
//!
//! ```text
//! {{t "email.activation.greeting" user.login}}
//! ```

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::anyhow;
use handlebars::{
    html_escape, Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    TemplateError,
};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::{
    domain::notifications::{
        errors::RenderError, Locale, MessageContext, TemplateRef, TemplateRenderer,
    },
    infrastructure::i18n::MessageCatalog,
};

const TEMPLATE_EXTENSION: &str = "hbs";

/// Errors raised while loading the template store
#[derive(Debug, Error)]
pub enum TemplateStoreError {
    /// A template file or directory could not be read
    #[error("failed to read template {path}")]
    Io {
        /// The path that failed
        path: PathBuf,

        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// A template failed to compile
    #[error("failed to compile template \"{name}\"")]
    Compile {
        /// The template name
        name: String,

        /// The underlying error
        #[source]
        source: Box<TemplateError>,
    },
}

/// Read-only Handlebars template store
pub struct HandlebarsRenderer {
    handlebars: Handlebars<'static>,
    default_locale: Locale,
}

impl HandlebarsRenderer {
    /// An empty store whose `t` helper reads from `catalog`.
    pub fn new(catalog: Arc<MessageCatalog>) -> Self {
        let default_locale = catalog.default_locale().clone();

        let mut handlebars = Handlebars::new();
        handlebars.register_helper("t", Box::new(TranslateHelper { catalog }));

        Self {
            handlebars,
            default_locale,
        }
    }

    /// Loads every `*.hbs` file below `dir`.
    pub fn from_dir(
        dir: impl AsRef<Path>,
        catalog: Arc<MessageCatalog>,
    ) -> Result<Self, TemplateStoreError> {
        let dir = dir.as_ref();
        let mut renderer = Self::new(catalog);

        for path in template_files(dir)? {
            let Some(name) = template_name(dir, &path) else {
                continue;
            };

            let source = fs::read_to_string(&path).map_err(|source| TemplateStoreError::Io {
                path: path.clone(),
                source,
            })?;

            renderer.register(&name, &source)?;
        }

        Ok(renderer)
    }

    /// Compiles and registers a template under `name`.
    pub fn register(&mut self, name: &str, source: &str) -> Result<(), TemplateStoreError> {
        self.handlebars
            .register_template_string(name, source)
            .map_err(|source| TemplateStoreError::Compile {
                name: name.to_string(),
                source: Box::new(source),
            })?;

        debug!(name, "Registered mail template");

        Ok(())
    }

    /// The registered variant of `name` that best matches `locale`.
    fn resolve(&self, name: &str, locale: &Locale) -> Option<String> {
        locale
            .lookup_chain(&self.default_locale)
            .into_iter()
            .map(|tag| format!("{name}.{tag}"))
            .chain(std::iter::once(name.to_string()))
            .find(|candidate| self.handlebars.has_template(candidate))
    }
}

impl fmt::Debug for HandlebarsRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut templates: Vec<_> = self.handlebars.get_templates().keys().collect();
        templates.sort();

        f.debug_struct("HandlebarsRenderer")
            .field("templates", &templates)
            .field("default_locale", &self.default_locale)
            .finish()
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(
        &self,
        template: &TemplateRef,
        locale: &Locale,
        context: &MessageContext,
    ) -> Result<String, RenderError> {
        let name = self
            .resolve(template.name, locale)
            .ok_or_else(|| RenderError::TemplateNotFound(template.name.to_string()))?;

        let body = self
            .handlebars
            .render(&name, context.vars())
            .map_err(|err| anyhow!("failed to render template \"{name}\": {err}"))?;

        if body.contains("<style") {
            return css_inline::inline(&body)
                .map_err(|err| anyhow!("failed to inline CSS of \"{name}\": {err}").into());
        }

        Ok(body)
    }
}

/// `{{t "key" arg0 arg1 ...}}`: catalog lookup in the context's `lang`.
///
/// Arguments are HTML-escaped before substitution. A missing key parameter
/// renders nothing.
struct TranslateHelper {
    catalog: Arc<MessageCatalog>,
}

impl HelperDef for TranslateHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let Some(key) = h.param(0).and_then(|param| param.value().as_str()) else {
            return Ok(());
        };

        let locale = ctx
            .data()
            .get("lang")
            .and_then(Value::as_str)
            .and_then(Locale::parse)
            .unwrap_or_else(|| self.catalog.default_locale().clone());

        let args: Vec<String> = h
            .params()
            .iter()
            .skip(1)
            .map(|param| match param.value() {
                Value::String(text) => html_escape(text),
                Value::Null => String::new(),
                other => html_escape(&other.to_string()),
            })
            .collect();

        out.write(&self.catalog.message(key, &locale, &args))?;

        Ok(())
    }
}

fn template_files(dir: &Path) -> Result<Vec<PathBuf>, TemplateStoreError> {
    let entries = fs::read_dir(dir).map_err(|source| TemplateStoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();

    for entry in entries {
        let path = entry
            .map_err(|source| TemplateStoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();

        if path.is_dir() {
            files.extend(template_files(&path)?);
        } else if path.extension().and_then(|ext| ext.to_str()) == Some(TEMPLATE_EXTENSION) {
            files.push(path);
        }
    }

    Ok(files)
}

/// `root/mail/activationEmail.fr.hbs` -> `mail/activationEmail.fr`
fn template_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");

    let parts: Vec<&str> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<_>>()?;

    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::domain::notifications::Recipient;

    use super::*;

    const WELCOME: TemplateRef = TemplateRef::new("mail/welcome", "email.welcome.title");

    fn locale(tag: &str) -> Locale {
        Locale::parse(tag).unwrap()
    }

    fn catalog() -> TestResult<Arc<MessageCatalog>> {
        let mut catalog = MessageCatalog::new(locale("en"));

        catalog.add_yaml(&locale("en"), "email:\n  welcome:\n    greeting: Dear {0}\n")?;
        catalog.add_yaml(&locale("fr"), "email:\n  welcome:\n    greeting: Cher {0}\n")?;

        Ok(Arc::new(catalog))
    }

    fn context(lang: &str) -> MessageContext {
        let recipient = Recipient::new("alice", "a@b.com", lang);

        MessageContext::for_recipient(&recipient, &locale(lang), "https://example.com")
    }

    fn renderer() -> TestResult<HandlebarsRenderer> {
        let mut renderer = HandlebarsRenderer::new(catalog()?);

        renderer.register(
            "mail/welcome",
            r#"<p>{{t "email.welcome.greeting" user.login}}</p><a href="{{baseUrl}}/account">link</a>"#,
        )?;

        Ok(renderer)
    }

    #[test]
    fn test_render_substitutes_variables_and_messages() -> TestResult {
        let body = renderer()?.render(&WELCOME, &locale("en"), &context("en"))?;

        assert_eq!(
            body,
            r#"<p>Dear alice</p><a href="https://example.com/account">link</a>"#
        );

        Ok(())
    }

    #[test]
    fn test_render_uses_context_language_for_messages() -> TestResult {
        let body = renderer()?.render(&WELCOME, &locale("fr"), &context("fr"))?;

        assert!(body.contains("Cher alice"));

        Ok(())
    }

    #[test]
    fn test_render_is_idempotent() -> TestResult {
        let renderer = renderer()?;
        let context = context("en");

        let first = renderer.render(&WELCOME, &locale("en"), &context)?;
        let second = renderer.render(&WELCOME, &locale("en"), &context)?;

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn test_unknown_template_is_not_found() -> TestResult {
        let missing = TemplateRef::new("mail/missing", "email.missing.title");

        let result = renderer()?.render(&missing, &locale("en"), &context("en"));

        assert!(matches!(result, Err(RenderError::TemplateNotFound(name)) if name == "mail/missing"));

        Ok(())
    }

    #[test]
    fn test_missing_variables_render_empty() -> TestResult {
        let mut renderer = HandlebarsRenderer::new(catalog()?);
        renderer.register("mail/welcome", "Hello {{user.firstName}}{{unknown.deeply.nested}}!")?;

        let body = renderer.render(&WELCOME, &locale("en"), &context("en"))?;

        assert_eq!(body, "Hello !");

        Ok(())
    }

    #[test]
    fn test_locale_variant_is_preferred() -> TestResult {
        let mut renderer = HandlebarsRenderer::new(catalog()?);
        renderer.register("mail/welcome", "default")?;
        renderer.register("mail/welcome.en", "english")?;
        renderer.register("mail/welcome.fr", "french")?;

        let render = |tag: &str| renderer.render(&WELCOME, &locale(tag), &context("en"));

        assert_eq!(render("fr")?, "french");
        assert_eq!(render("fr-ca")?, "french");
        assert_eq!(render("de")?, "english");

        Ok(())
    }

    #[test]
    fn test_bare_template_is_the_last_resort() -> TestResult {
        let mut renderer = HandlebarsRenderer::new(catalog()?);
        renderer.register("mail/welcome", "default")?;
        renderer.register("mail/welcome.fr", "french")?;

        let body = renderer.render(&WELCOME, &locale("de"), &context("en"))?;

        assert_eq!(body, "default");

        Ok(())
    }

    #[test]
    fn test_variables_are_html_escaped() -> TestResult {
        let mut renderer = HandlebarsRenderer::new(catalog()?);
        renderer.register("mail/welcome", "<p>{{body}}</p>")?;

        let context = MessageContext::new(
            &locale("en"),
            [("body".to_string(), Value::String("<script>".to_string()))],
        );

        let body = renderer.render(&WELCOME, &locale("en"), &context)?;

        assert_eq!(body, "<p>&lt;script&gt;</p>");

        Ok(())
    }

    #[test]
    fn test_message_arguments_are_html_escaped() -> TestResult {
        let mut renderer = HandlebarsRenderer::new(catalog()?);
        renderer.register("mail/welcome", r#"{{t "email.welcome.greeting" user.login}}"#)?;

        let recipient = Recipient::new("<b>eve</b>", "e@b.com", "en");
        let context = MessageContext::for_recipient(&recipient, &locale("en"), "");

        let body = renderer.render(&WELCOME, &locale("en"), &context)?;

        assert_eq!(body, "Dear &lt;b&gt;eve&lt;/b&gt;");

        Ok(())
    }

    #[test]
    fn test_unknown_message_key_renders_the_key() -> TestResult {
        let mut renderer = HandlebarsRenderer::new(catalog()?);
        renderer.register("mail/welcome", r#"{{t "email.nope"}}"#)?;

        let body = renderer.render(&WELCOME, &locale("en"), &context("en"))?;

        assert_eq!(body, "email.nope");

        Ok(())
    }

    #[test]
    fn test_style_blocks_are_inlined() -> TestResult {
        let mut renderer = HandlebarsRenderer::new(catalog()?);
        renderer.register(
            "mail/welcome",
            "<html><head><style>p { color: red; }</style></head><body><p>Hi</p></body></html>",
        )?;

        let body = renderer.render(&WELCOME, &locale("en"), &context("en"))?;

        assert!(body.contains("<p style="));
        assert!(!body.contains("<style"));

        Ok(())
    }

    #[test]
    fn test_register_rejects_invalid_template() -> TestResult {
        let mut renderer = HandlebarsRenderer::new(catalog()?);

        let result = renderer.register("mail/broken", "{{#if}}");

        assert!(matches!(result, Err(TemplateStoreError::Compile { .. })));

        Ok(())
    }

    #[test]
    fn test_from_dir_registers_nested_templates() -> TestResult {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("mail"))?;
        fs::write(dir.path().join("mail/welcome.hbs"), "default")?;
        fs::write(dir.path().join("mail/welcome.fr.hbs"), "french")?;
        fs::write(dir.path().join("mail/notes.txt"), "ignored")?;

        let renderer = HandlebarsRenderer::from_dir(dir.path(), catalog()?)?;

        assert_eq!(
            renderer.render(&WELCOME, &locale("fr"), &context("fr"))?,
            "french"
        );
        assert_eq!(
            renderer.render(&WELCOME, &locale("en"), &context("en"))?,
            "default"
        );

        Ok(())
    }

    #[test]
    fn test_template_name_strips_root_and_extension() {
        let name = template_name(
            Path::new("/srv/templates"),
            Path::new("/srv/templates/mail/activationEmail.fr.hbs"),
        );

        assert_eq!(name.as_deref(), Some("mail/activationEmail.fr"));
    }
}
