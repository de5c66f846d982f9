//! Locale resolution: fallback derivation and per-request locale precedence.

use crate::config::YaltConfig;
use crate::i18n::LocaleRegistry;

/// A locale together with the locale to consult when it has no translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocale {
    pub locale: String,
    /// `None` when fallback is disabled or nothing can be derived
    pub fallback: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LocaleResolver {
    separator: String,
    fallback_locale: Option<String>,
    use_fallback: bool,
}

impl LocaleResolver {
    pub fn new(
        separator: impl Into<String>,
        fallback_locale: Option<String>,
        use_fallback: bool,
    ) -> Self {
        Self {
            separator: separator.into(),
            fallback_locale,
            use_fallback,
        }
    }

    pub fn from_config(config: &YaltConfig) -> Self {
        Self::new(
            config.locale_separator.clone(),
            config.fallback_locale.clone(),
            config.use_fallback,
        )
    }

    /// Whether a locale carries a region part ("en-US").
    pub fn is_country_based(&self, locale: &str) -> bool {
        locale.contains(self.separator.as_str())
    }

    /// Language part of a region-qualified locale.
    pub fn language_of<'a>(&self, locale: &'a str) -> &'a str {
        locale
            .split_once(self.separator.as_str())
            .map_or(locale, |(language, _)| language)
    }

    /// Locale to consult when `locale` has no translation.
    ///
    /// Region-qualified codes fall back to their language; everything else
    /// falls back to the configured global fallback, if any.
    pub fn fallback_for(&self, locale: &str) -> Option<String> {
        if self.is_country_based(locale) {
            let language = self.language_of(locale);
            if !language.is_empty() {
                return Some(language.to_string());
            }
        }

        self.fallback_locale.clone()
    }

    /// Configured process-wide fallback flag.
    pub fn use_fallback(&self) -> bool {
        self.use_fallback
    }

    /// Pair `locale` with its fallback, honoring `use_fallback`
    /// (the configured flag when `None`).
    pub fn with_locale_fallback(&self, locale: &str, use_fallback: Option<bool>) -> ResolvedLocale {
        let fallback = if use_fallback.unwrap_or(self.use_fallback) {
            self.fallback_for(locale).filter(|f| f != locale)
        } else {
            None
        };

        ResolvedLocale {
            locale: locale.to_string(),
            fallback,
        }
    }

    /// Pick the locale for a request.
    ///
    /// Precedence: first registered locale named by the header, then the
    /// user's stored preference, then the application default. Only the
    /// header is validated; the other two are trusted. Header tags match
    /// case-insensitively and resolve to the registered spelling.
    pub fn resolve_request_locale(
        &self,
        header: Option<&str>,
        user_preference: Option<&str>,
        default_locale: &str,
        registry: &LocaleRegistry,
    ) -> String {
        header
            .and_then(|value| {
                parse_accept_language(value)
                    .iter()
                    .find_map(|tag| registry.find_ignore_case(tag))
                    .map(str::to_string)
            })
            .or_else(|| user_preference.map(str::to_string))
            .unwrap_or_else(|| default_locale.to_string())
    }
}

/// Parse an `Accept-Language` value into tags ordered by preference.
///
/// Tags keep header order among equal weights; `q=0` entries and the `*`
/// wildcard are dropped, as are malformed weights.
pub fn parse_accept_language(value: &str) -> Vec<String> {
    let mut tags: Vec<(String, f32)> = Vec::new();

    for part in value.split(',') {
        let mut components = part.split(';');
        let tag = components.next().unwrap_or("").trim();
        if tag.is_empty() || tag == "*" {
            continue;
        }

        let mut weight = 1.0_f32;
        for param in components {
            if let Some(q) = param.trim().strip_prefix("q=") {
                weight = match q.trim().parse::<f32>() {
                    Ok(q) if (0.0..=1.0).contains(&q) => q,
                    _ => 0.0,
                };
            }
        }

        if weight > 0.0 {
            tags.push((tag.to_string(), weight));
        }
    }

    // sort_by is stable, so equal weights keep header order
    tags.sort_by(|a, b| b.1.total_cmp(&a.1));
    tags.into_iter().map(|(tag, _)| tag).collect()
}
