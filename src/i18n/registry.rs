//! Locale registry: single source of truth for the locales translations may use.
//!
//! The flattened list is built from configuration on first access with a
//! `OnceLock` and is immutable afterwards, so a registry can be shared by
//! reference across concurrent requests.

use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::config::YaltConfig;
use crate::error::{Result, YaltError};

/// Registry of valid locale codes.
#[derive(Debug)]
pub struct LocaleRegistry {
    groups: IndexMap<String, Vec<String>>,
    separator: String,
    locales: OnceLock<Vec<String>>,
}

impl LocaleRegistry {
    /// Create a registry from language -> region groups.
    pub fn new(groups: IndexMap<String, Vec<String>>, separator: impl Into<String>) -> Self {
        Self {
            groups,
            separator: separator.into(),
            locales: OnceLock::new(),
        }
    }

    pub fn from_config(config: &YaltConfig) -> Self {
        Self::new(config.locales.clone(), config.locale_separator.clone())
    }

    /// Get every valid locale code.
    ///
    /// Languages keep their configured order. Each contributes its bare code
    /// followed by one `language + separator + region` code per region.
    pub fn locales(&self) -> &[String] {
        self.locales.get_or_init(|| {
            let mut locales = Vec::new();
            for (language, regions) in &self.groups {
                locales.push(language.clone());
                for region in regions {
                    locales.push(format!("{}{}{}", language, self.separator, region));
                }
            }
            locales
        })
    }

    /// Check if a locale code is registered. Never fails.
    pub fn is_valid_locale(&self, code: &str) -> bool {
        self.locales().iter().any(|locale| locale == code)
    }

    /// Registered spelling of `code`, compared ASCII case-insensitively.
    pub fn find_ignore_case(&self, code: &str) -> Option<&str> {
        self.locales()
            .iter()
            .find(|locale| locale.eq_ignore_ascii_case(code))
            .map(String::as_str)
    }

    /// Return the code back if it is registered.
    ///
    /// # Errors
    /// `YaltError::UnsupportedLocale` for unknown codes.
    pub fn validate<'a>(&self, code: &'a str) -> Result<&'a str> {
        if self.is_valid_locale(code) {
            Ok(code)
        } else {
            Err(YaltError::UnsupportedLocale(code.to_string()))
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }
}
