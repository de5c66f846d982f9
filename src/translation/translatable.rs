use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::merge::{all_localized_values, effective_values, extract_translations, resolve_translation};
use super::{TranslationRecord, Translations};
use crate::error::Result;
use crate::Yalt;

/// An entity whose `TRANSLATABLE` fields are stored per locale in a
/// companion translations table.
///
/// # Example
///
/// ```rust,ignore
/// struct Article {
///     id: Option<i64>,
///     slug: String,
///     translations: Translations,
/// }
///
/// impl Translatable for Article {
///     const TRANSLATABLE: &'static [&'static str] = &["title", "body"];
///     const TABLE: &'static str = "articles";
///     const FOREIGN_KEY: &'static str = "article_id";
///     // ...
/// }
///
/// article.fill(payload, &yalt)?;
/// let title = article.translated("title", "en-US", &yalt);
/// ```
pub trait Translatable {
    /// Fields stored in the translations table
    const TRANSLATABLE: &'static [&'static str];

    /// Owner table name, snake case and plural ("articles")
    const TABLE: &'static str;

    /// Column in the translations table referencing the owner
    const FOREIGN_KEY: &'static str;

    /// Owner primary key column
    const KEY_NAME: &'static str = "id";

    /// Owner id, `None` until the owner is saved.
    fn key(&self) -> Option<i64>;

    fn translations(&self) -> &Translations;

    fn translations_mut(&mut self) -> &mut Translations;

    /// Assign the non-translatable part of a fill payload.
    fn fill_attributes(&mut self, attributes: Map<String, Value>) -> Result<()>;

    fn translations_table() -> String {
        format!("{}_translations", Self::TABLE)
    }

    /// Locale column override; the configured `locale_key` when `None`.
    fn locale_key() -> Option<&'static str> {
        None
    }

    /// Per-entity fallback override; the configured flag when `None`.
    fn use_translation_fallback(&self) -> Option<bool> {
        None
    }

    fn with_translation_fallback(&self, yalt: &Yalt) -> bool {
        self.use_translation_fallback()
            .unwrap_or_else(|| yalt.use_fallback())
    }

    fn is_translatable(field: &str) -> bool {
        Self::TRANSLATABLE.contains(&field)
    }

    /// The translatable entries of `attributes`.
    fn translatable_from(attributes: &Map<String, Value>) -> Map<String, Value> {
        attributes
            .iter()
            .filter(|(key, _)| Self::is_translatable(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Fill from a payload where each translatable field is a locale-keyed
    /// object (`{"title": {"en": "Hi"}}`). Translations go to their
    /// records, everything else to `fill_attributes`.
    ///
    /// Translations are merged only after `fill_attributes` succeeds.
    ///
    /// # Errors
    /// `UnsupportedLocale` or `TranslationShape`, or whatever
    /// `fill_attributes` returns; translations are untouched then.
    fn fill(&mut self, mut attributes: Map<String, Value>, yalt: &Yalt) -> Result<()> {
        let extracted = if attributes.keys().any(|key| Self::is_translatable(key)) {
            extract_translations(&mut attributes, Self::TRANSLATABLE, yalt.registry())?
        } else {
            BTreeMap::new()
        };

        self.fill_attributes(attributes)?;

        for (locale, values) in extracted {
            self.translations_mut()
                .fill_locale(&locale, values, Self::TRANSLATABLE);
        }
        Ok(())
    }

    /// Record for `locale`, created and registered when missing.
    fn translation_to(&mut self, locale: &str) -> &mut TranslationRecord {
        self.translations_mut().get_or_create(locale)
    }

    /// Translatable values for `locale`, falling back per
    /// `with_fallback` (the entity/config default when `None`).
    fn translations_for(
        &self,
        locale: &str,
        with_fallback: Option<bool>,
        yalt: &Yalt,
    ) -> BTreeMap<String, Option<String>> {
        let with_fallback = with_fallback.unwrap_or_else(|| self.with_translation_fallback(yalt));
        effective_values(
            self.translations(),
            locale,
            Self::TRANSLATABLE,
            with_fallback,
            yalt.resolver(),
        )
    }

    /// Value of one translatable field in `locale`.
    fn translated(&self, field: &str, locale: &str, yalt: &Yalt) -> Option<&str> {
        if !Self::is_translatable(field) {
            return None;
        }
        resolve_translation(
            self.translations(),
            locale,
            self.with_translation_fallback(yalt),
            yalt.resolver(),
        )
        .and_then(|record| record.get(field))
    }

    /// All non-null translated values as field -> locale -> value.
    fn translated_attributes(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        all_localized_values(self.translations(), Self::TRANSLATABLE)
    }

    /// Serialize the entity, merging every locale's translated fields when
    /// translations were loaded or `loads_translations` is set.
    fn to_localized_value(&self, yalt: &Yalt) -> Result<Value>
    where
        Self: Serialize,
    {
        let mut value = serde_json::to_value(self)?;

        if self.translations().is_loaded() || yalt.config().loads_translations {
            if let Value::Object(map) = &mut value {
                map.remove("translations");
                for (field, locales) in self.translated_attributes() {
                    map.insert(field, serde_json::to_value(locales)?);
                }
            }
        }

        Ok(value)
    }

    /// Serialize the entity with translatable fields resolved for one locale.
    fn to_value_in(&self, locale: &str, yalt: &Yalt) -> Result<Value>
    where
        Self: Serialize,
    {
        let mut value = serde_json::to_value(self)?;

        if let Value::Object(map) = &mut value {
            map.remove("translations");
            let values = self.translations_for(locale, None, yalt);
            for field in Self::TRANSLATABLE {
                let translated = values.get(*field).cloned().flatten();
                map.insert(field.to_string(), serde_json::to_value(translated)?);
            }
        }

        Ok(value)
    }
}
