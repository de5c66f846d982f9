//! Request-scoped "current locale".
//!
//! A context is created per request by the localization middleware and
//! passed along explicitly (request extensions, handler arguments). It is
//! never global state.

#[derive(Debug, Clone, PartialEq, Eq)]
enum LocaleState {
    Unset,
    Resolved(String),
}

/// Current locale of one request.
///
/// Starts `Unset`; the first read or an explicit set moves it to
/// `Resolved`, and it never goes back within the same scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleContext {
    default_locale: String,
    state: LocaleState,
}

impl LocaleContext {
    /// Unset context that resolves to `default_locale` when first read.
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
            state: LocaleState::Unset,
        }
    }

    /// Context already resolved to `locale`.
    pub fn resolved(default_locale: impl Into<String>, locale: impl Into<String>) -> Self {
        let mut context = Self::new(default_locale);
        context.set_current(locale);
        context
    }

    /// Current locale; caches the default on first read.
    pub fn current(&mut self) -> &str {
        if self.state == LocaleState::Unset {
            self.state = LocaleState::Resolved(self.default_locale.clone());
        }
        self.locale()
    }

    /// Current locale without touching the state.
    pub fn locale(&self) -> &str {
        match &self.state {
            LocaleState::Resolved(locale) => locale,
            LocaleState::Unset => &self.default_locale,
        }
    }

    pub fn set_current(&mut self, locale: impl Into<String>) {
        self.state = LocaleState::Resolved(locale.into());
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, LocaleState::Resolved(_))
    }
}
