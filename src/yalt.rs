use crate::config::YaltConfig;
use crate::i18n::{LocaleContext, LocaleRegistry, LocaleResolver};

/// Shared translation service: configuration, registry and resolver.
///
/// Built once at startup and shared as `Arc<Yalt>`. Everything inside is
/// immutable after construction, apart from the registry's lazily computed
/// locale list.
#[derive(Debug)]
pub struct Yalt {
    config: YaltConfig,
    registry: LocaleRegistry,
    resolver: LocaleResolver,
}

impl Yalt {
    pub fn new(config: YaltConfig) -> Self {
        let registry = LocaleRegistry::from_config(&config);
        let resolver = LocaleResolver::from_config(&config);
        Self {
            config,
            registry,
            resolver,
        }
    }

    pub fn config(&self) -> &YaltConfig {
        &self.config
    }

    pub fn registry(&self) -> &LocaleRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &LocaleResolver {
        &self.resolver
    }

    pub fn locales(&self) -> &[String] {
        self.registry.locales()
    }

    pub fn is_valid_locale(&self, code: &str) -> bool {
        self.registry.is_valid_locale(code)
    }

    pub fn fallback_for(&self, locale: &str) -> Option<String> {
        self.resolver.fallback_for(locale)
    }

    pub fn use_fallback(&self) -> bool {
        self.resolver.use_fallback()
    }

    pub fn locale_key(&self) -> &str {
        &self.config.locale_key
    }

    /// Fresh, unset context for a new request.
    pub fn context(&self) -> LocaleContext {
        LocaleContext::new(self.config.default_locale.clone())
    }

    /// Resolve the locale of a request and return it as a context.
    pub fn context_for_request(
        &self,
        header: Option<&str>,
        user_preference: Option<&str>,
    ) -> LocaleContext {
        let locale = self.resolver.resolve_request_locale(
            header,
            user_preference,
            &self.config.default_locale,
            &self.registry,
        );
        LocaleContext::resolved(self.config.default_locale.clone(), locale)
    }
}
