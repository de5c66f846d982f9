use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;

/// Translation settings shared by the registry, resolver and middleware.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct YaltConfig {
    /// Language code -> region variants ("en" -> ["US", "GB"]).
    /// An empty list registers the bare language only.
    #[serde(default)]
    pub locales: IndexMap<String, Vec<String>>,

    #[serde(default = "default_separator")]
    pub locale_separator: String,

    /// Column holding the locale in every translations table
    #[serde(default = "default_locale_key")]
    pub locale_key: String,

    /// Consulted when a locale has no region part to fall back to
    #[serde(default)]
    pub fallback_locale: Option<String>,

    #[serde(default)]
    pub use_fallback: bool,

    /// Always merge localized fields into serialized entities
    #[serde(default)]
    pub loads_translations: bool,

    /// Application default locale, used when a request carries no usable hint
    #[serde(default = "default_app_locale")]
    pub default_locale: String,
}

fn default_separator() -> String {
    "-".to_string()
}

fn default_locale_key() -> String {
    "locale".to_string()
}

fn default_app_locale() -> String {
    "en".to_string()
}

impl Default for YaltConfig {
    fn default() -> Self {
        Self {
            locales: IndexMap::new(),
            locale_separator: default_separator(),
            locale_key: default_locale_key(),
            fallback_locale: None,
            use_fallback: false,
            loads_translations: false,
            default_locale: default_app_locale(),
        }
    }
}

impl YaltConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            // Format: "en:US:GB,fr,ru"
            locales: std::env::var("YALT_LOCALES")
                .map(|v| parse_locales(&v))
                .unwrap_or_default(),
            locale_separator: std::env::var("YALT_LOCALE_SEPARATOR")
                .unwrap_or_else(|_| default_separator()),
            locale_key: std::env::var("YALT_LOCALE_KEY")
                .unwrap_or_else(|_| default_locale_key()),
            fallback_locale: std::env::var("YALT_FALLBACK_LOCALE")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            use_fallback: parse_flag("YALT_USE_FALLBACK")?,
            loads_translations: parse_flag("YALT_LOADS_TRANSLATIONS")?,
            default_locale: std::env::var("APP_LOCALE")
                .unwrap_or_else(|_| default_app_locale()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the values that end up inside SQL or locale splitting.
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.locale_key) {
            bail!("YALT_LOCALE_KEY '{}' is not a valid column name", self.locale_key);
        }
        if self.locale_separator.is_empty() {
            bail!("YALT_LOCALE_SEPARATOR must not be empty");
        }
        Ok(())
    }
}

/// Settings for the demo server binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub yalt: YaltConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL not set")?,
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            yalt: YaltConfig::from_env()?,
        })
    }
}

/// Parse "en:US:GB,fr,ru" into a language -> regions map.
pub fn parse_locales(value: &str) -> IndexMap<String, Vec<String>> {
    let mut locales = IndexMap::new();

    for group in value.split(',') {
        let mut parts = group.split(':').map(str::trim).filter(|p| !p.is_empty());
        let Some(language) = parts.next() else {
            continue;
        };
        let regions: &mut Vec<String> = locales.entry(language.to_string()).or_default();
        for region in parts {
            if !regions.iter().any(|r| r == region) {
                regions.push(region.to_string());
            }
        }
    }

    locales
}

fn parse_flag(name: &str) -> Result<bool> {
    match std::env::var(name) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => bail!("{} must be a boolean, got '{}'", name, other),
        },
        Err(_) => Ok(false),
    }
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 7] = [
        "YALT_LOCALES",
        "YALT_LOCALE_SEPARATOR",
        "YALT_LOCALE_KEY",
        "YALT_FALLBACK_LOCALE",
        "YALT_USE_FALLBACK",
        "YALT_LOADS_TRANSLATIONS",
        "APP_LOCALE",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    // ==================== parse_locales Tests ====================

    #[test]
    fn test_parse_locales_with_regions() {
        let locales = parse_locales("en:US:GB,fr,ru");

        assert_eq!(locales.len(), 3);
        assert_eq!(locales["en"], vec!["US".to_string(), "GB".to_string()]);
        assert!(locales["fr"].is_empty());
        assert!(locales["ru"].is_empty());
    }

    #[test]
    fn test_parse_locales_trims_and_skips_empty_groups() {
        let locales = parse_locales(" en : US , , fr ");

        assert_eq!(locales.len(), 2);
        assert_eq!(locales["en"], vec!["US".to_string()]);
        assert!(locales.contains_key("fr"));
    }

    #[test]
    fn test_parse_locales_merges_repeated_language() {
        let locales = parse_locales("en:US,en:GB,en:US");
        assert_eq!(locales["en"], vec!["US".to_string(), "GB".to_string()]);
    }

    #[test]
    fn test_parse_locales_keeps_configured_order() {
        let locales = parse_locales("ru,en:US,fr");
        let languages: Vec<&str> = locales.keys().map(String::as_str).collect();

        assert_eq!(languages, vec!["ru", "en", "fr"]);
    }

    #[test]
    fn test_parse_locales_empty() {
        assert!(parse_locales("").is_empty());
    }

    // ==================== Identifier Tests ====================

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("locale"));
        assert!(is_identifier("_lang2"));
        assert!(!is_identifier("2lang"));
        assert!(!is_identifier("locale; DROP TABLE x"));
        assert!(!is_identifier(""));
    }

    // ==================== Deserialize Tests ====================

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: YaltConfig =
            serde_json::from_str(r#"{"locales": {"en": ["US"], "fr": []}}"#).expect("deserialize");

        assert_eq!(config.locale_separator, "-");
        assert_eq!(config.locale_key, "locale");
        assert_eq!(config.default_locale, "en");
        assert!(config.fallback_locale.is_none());
        assert!(!config.use_fallback);
        assert!(!config.loads_translations);
        assert_eq!(config.locales["en"], vec!["US".to_string()]);
    }

    #[test]
    fn test_deserialize_keeps_locale_order() {
        let config: YaltConfig =
            serde_json::from_str(r#"{"locales": {"ru": [], "en": ["US"], "de": []}}"#)
                .expect("deserialize");
        let languages: Vec<&str> = config.locales.keys().map(String::as_str).collect();

        assert_eq!(languages, vec!["ru", "en", "de"]);
    }

    #[test]
    fn test_validate_rejects_bad_locale_key() {
        let config = YaltConfig {
            locale_key: "lo cale".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    // ==================== from_env Tests ====================

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();

        let config = YaltConfig::from_env().expect("config");
        assert_eq!(config, YaltConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_all_values() {
        clear_env();
        std::env::set_var("YALT_LOCALES", "en:US,ru");
        std::env::set_var("YALT_LOCALE_SEPARATOR", "_");
        std::env::set_var("YALT_LOCALE_KEY", "lang");
        std::env::set_var("YALT_FALLBACK_LOCALE", "en");
        std::env::set_var("YALT_USE_FALLBACK", "true");
        std::env::set_var("YALT_LOADS_TRANSLATIONS", "1");
        std::env::set_var("APP_LOCALE", "ru");

        let config = YaltConfig::from_env().expect("config");
        clear_env();

        assert_eq!(config.locales["en"], vec!["US".to_string()]);
        assert_eq!(config.locale_separator, "_");
        assert_eq!(config.locale_key, "lang");
        assert_eq!(config.fallback_locale.as_deref(), Some("en"));
        assert!(config.use_fallback);
        assert!(config.loads_translations);
        assert_eq!(config.default_locale, "ru");
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_flag() {
        clear_env();
        std::env::set_var("YALT_USE_FALLBACK", "maybe");

        let result = YaltConfig::from_env();
        clear_env();

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("YALT_USE_FALLBACK"));
    }

    #[test]
    #[serial]
    fn test_server_config_requires_database_url() {
        clear_env();
        std::env::remove_var("DATABASE_URL");

        let result = Config::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("DATABASE_URL"));
    }
}
