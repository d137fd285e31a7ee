//! Template rendering

#[cfg(test)]
use mockall::mock;

use super::{errors::RenderError, Locale, MessageContext, TemplateRef};

/// Renders mail bodies from a read-only template store.
pub trait TemplateRenderer: Send + Sync + 'static {
    /// Renders the template named by `template` for `locale`.
    ///
    /// # Arguments
    /// * `template` - The [`TemplateRef`] naming the template.
    /// * `locale` - The [`Locale`] to pick a template variant for.
    /// * `context` - The [`MessageContext`] bindings.
    ///
    /// # Returns
    /// The rendered body, or [`RenderError::TemplateNotFound`] when no
    /// variant of the template exists. Variables missing from the context
    /// render as empty strings.
    fn render(
        &self,
        template: &TemplateRef,
        locale: &Locale,
        context: &MessageContext,
    ) -> Result<String, RenderError>;
}

#[cfg(test)]
mock! {
    pub TemplateRenderer {}

    impl TemplateRenderer for TemplateRenderer {
        fn render(
            &self,
            template: &TemplateRef,
            locale: &Locale,
            context: &MessageContext,
        ) -> Result<String, RenderError>;
    }
}
