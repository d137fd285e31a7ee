//! Template references

/// Names a mail template and the catalog key of its subject line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemplateRef {
    /// Template name in the template store
    pub name: &'static str,

    /// Message catalog key of the subject line
    pub subject_key: &'static str,
}

impl TemplateRef {
    /// Account activation notice
    pub const ACTIVATION: Self = Self::new("mail/activationEmail", "email.activation.title");

    /// Account created by an administrator
    pub const CREATION: Self = Self::new("mail/creationEmail", "email.activation.title");

    /// Password reset notice
    pub const PASSWORD_RESET: Self = Self::new("mail/passwordResetEmail", "email.reset.title");

    /// Free-form message wrapper used by the synchronous raw path
    pub const SIMPLE: Self = Self::new("mail/simpleEmail", "email.simple.title");

    /// Creates a template reference
    pub const fn new(name: &'static str, subject_key: &'static str) -> Self {
        Self { name, subject_key }
    }
}
