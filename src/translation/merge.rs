//! Splitting fill payloads into per-locale values, and merging stored
//! translations back into localized views.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{TranslationRecord, Translations};
use crate::error::{Result, YaltError};
use crate::i18n::{LocaleRegistry, LocaleResolver};

/// locale -> field -> value
pub type LocaleValues = BTreeMap<String, BTreeMap<String, Option<String>>>;

/// Pull every translatable field out of `attributes`.
///
/// Each translatable value must be an object keyed by locale whose values
/// are strings or null. The whole payload is validated before anything is
/// removed: on error `attributes` is left untouched and nothing is
/// returned. On success the translatable keys are gone from `attributes`.
pub fn extract_translations(
    attributes: &mut Map<String, Value>,
    translatable: &[&str],
    registry: &LocaleRegistry,
) -> Result<LocaleValues> {
    let mut translations = LocaleValues::new();

    for (field, value) in attributes.iter() {
        if !translatable.contains(&field.as_str()) {
            continue;
        }

        let Value::Object(localized) = value else {
            return Err(shape_error(field, value));
        };

        for (locale, localization) in localized {
            registry.validate(locale)?;

            let localization = match localization {
                Value::String(text) => Some(text.clone()),
                Value::Null => None,
                other => return Err(shape_error(&format!("{}.{}", field, locale), other)),
            };

            translations
                .entry(locale.clone())
                .or_default()
                .insert(field.clone(), localization);
        }
    }

    attributes.retain(|field, _| !translatable.contains(&field.as_str()));

    Ok(translations)
}

fn shape_error(field: &str, value: &Value) -> YaltError {
    YaltError::TranslationShape {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Record for `locale`, or for its fallback when `use_fallback` is set.
pub fn resolve_translation<'a>(
    translations: &'a Translations,
    locale: &str,
    use_fallback: bool,
    resolver: &LocaleResolver,
) -> Option<&'a TranslationRecord> {
    translations.translation_for(locale).or_else(|| {
        if !use_fallback {
            return None;
        }
        resolver
            .fallback_for(locale)
            .and_then(|fallback| translations.translation_for(&fallback))
    })
}

/// Translatable values to show for `locale`.
///
/// Empty when neither the locale nor (with `use_fallback`) its fallback has
/// a record. Fields outside `translatable` are never returned.
pub fn effective_values(
    translations: &Translations,
    locale: &str,
    translatable: &[&str],
    use_fallback: bool,
    resolver: &LocaleResolver,
) -> BTreeMap<String, Option<String>> {
    resolve_translation(translations, locale, use_fallback, resolver)
        .map(|record| record.only(translatable))
        .unwrap_or_default()
}

/// Every non-null translated value as field -> locale -> value.
pub fn all_localized_values(
    translations: &Translations,
    translatable: &[&str],
) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut localized: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();

    for record in translations {
        for field in translatable {
            if let Some(value) = record.get(field) {
                localized
                    .entry(field.to_string())
                    .or_default()
                    .insert(record.locale().to_string(), value.to_string());
            }
        }
    }

    localized
}
