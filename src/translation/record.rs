use serde::Serialize;
use std::collections::BTreeMap;

/// Translated field values of one owner in one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationRecord {
    locale: String,
    #[serde(flatten)]
    values: BTreeMap<String, Option<String>>,
    /// Row already exists in the store
    #[serde(skip)]
    exists: bool,
}

impl TranslationRecord {
    /// New, not yet persisted record with no values.
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            values: BTreeMap::new(),
            exists: false,
        }
    }

    /// Record as read back from the store.
    pub fn persisted(locale: impl Into<String>, values: BTreeMap<String, Option<String>>) -> Self {
        Self {
            locale: locale.into(),
            values,
            exists: true,
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(|v| v.as_deref())
    }

    pub fn has(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Option<String>) {
        self.values.insert(field.into(), value);
    }

    /// Merge `values` over the current ones.
    pub fn fill(&mut self, values: BTreeMap<String, Option<String>>) {
        self.values.extend(values);
    }

    pub fn values(&self) -> &BTreeMap<String, Option<String>> {
        &self.values
    }

    /// Values restricted to `fields`, keeping nulls.
    pub fn only(&self, fields: &[&str]) -> BTreeMap<String, Option<String>> {
        self.values
            .iter()
            .filter(|(field, _)| fields.contains(&field.as_str()))
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect()
    }

    /// True when none of `fields` holds a value.
    pub fn is_blank(&self, fields: &[&str]) -> bool {
        fields.iter().all(|field| self.get(field).is_none())
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn mark_persisted(&mut self) {
        self.exists = true;
    }
}
