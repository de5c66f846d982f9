use std::collections::BTreeMap;

use super::TranslationRecord;

/// In-memory translation records of one owner, at most one per locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translations {
    records: Vec<TranslationRecord>,
    /// Persisted records pruned since the last save
    deleted: Vec<TranslationRecord>,
    /// Records were read from the store
    loaded: bool,
}

impl Translations {
    /// Empty collection that was not read from a store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection read from a store. Later records for an already seen
    /// locale are dropped.
    pub fn from_records(records: impl IntoIterator<Item = TranslationRecord>) -> Self {
        let mut translations = Self {
            loaded: true,
            ..Self::default()
        };
        for record in records {
            if translations.translation_for(record.locale()).is_none() {
                translations.records.push(record);
            }
        }
        translations
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranslationRecord> {
        self.records.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TranslationRecord> {
        self.records.iter_mut()
    }

    /// Record for `locale`, if one is registered.
    pub fn translation_for(&self, locale: &str) -> Option<&TranslationRecord> {
        self.records.iter().find(|record| record.locale() == locale)
    }

    /// Existing record for `locale`, or a new empty one registered in the
    /// collection. Calling it twice never creates a second record.
    pub fn get_or_create(&mut self, locale: &str) -> &mut TranslationRecord {
        let index = match self.records.iter().position(|r| r.locale() == locale) {
            Some(index) => index,
            None => {
                self.records.push(TranslationRecord::new(locale));
                self.records.len() - 1
            }
        };
        &mut self.records[index]
    }

    /// Merge `values` into the record for `locale`.
    ///
    /// A record left without any value among `fields` is removed; if it
    /// was persisted it is queued for deletion on the next save.
    pub fn fill_locale(
        &mut self,
        locale: &str,
        values: BTreeMap<String, Option<String>>,
        fields: &[&str],
    ) {
        let record = self.get_or_create(locale);
        record.fill(values);

        if record.is_blank(fields) {
            self.prune(locale);
        }
    }

    fn prune(&mut self, locale: &str) {
        if let Some(index) = self.records.iter().position(|r| r.locale() == locale) {
            let record = self.records.remove(index);
            if record.exists() {
                self.deleted.push(record);
            }
        }
    }

    /// Persisted records waiting to be deleted from the store.
    pub fn pending_deletions(&self) -> &[TranslationRecord] {
        &self.deleted
    }

    /// Prune every record left without a value among `fields`, including
    /// ones emptied through `get_or_create` or `TranslationRecord::set`.
    pub fn prune_blank(&mut self, fields: &[&str]) {
        let (blank, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|record| record.is_blank(fields));
        self.records = kept;
        self.deleted.extend(blank.into_iter().filter(TranslationRecord::exists));
    }

    /// Drop the queued deletion for `locale` once the store removed it.
    pub(crate) fn forget_deleted(&mut self, locale: &str) {
        self.deleted.retain(|record| record.locale() != locale);
    }
}

impl<'a> IntoIterator for &'a Translations {
    type Item = &'a TranslationRecord;
    type IntoIter = std::slice::Iter<'a, TranslationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[&str] = &["title", "body"];

    fn values(pairs: &[(&str, Option<&str>)]) -> BTreeMap<String, Option<String>> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    // ==================== Lookup Tests ====================

    #[test]
    fn test_translation_for_missing_locale() {
        let translations = Translations::new();
        assert!(translations.translation_for("en").is_none());
        assert!(!translations.is_loaded());
    }

    #[test]
    fn test_from_records_marks_loaded_and_keeps_first_per_locale() {
        let translations = Translations::from_records(vec![
            TranslationRecord::persisted("en", values(&[("title", Some("One"))])),
            TranslationRecord::persisted("en", values(&[("title", Some("Two"))])),
            TranslationRecord::persisted("fr", values(&[("title", Some("Un"))])),
        ]);

        assert!(translations.is_loaded());
        assert_eq!(translations.len(), 2);
        assert_eq!(translations.translation_for("en").and_then(|r| r.get("title")), Some("One"));
    }

    // ==================== get_or_create Tests ====================

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut translations = Translations::new();

        translations.get_or_create("en").set("title", Some("Hi".to_string()));
        let again = translations.get_or_create("en");

        assert_eq!(again.get("title"), Some("Hi"));
        assert_eq!(translations.len(), 1);
    }

    #[test]
    fn test_get_or_create_stamps_locale() {
        let mut translations = Translations::new();
        let record = translations.get_or_create("ru");

        assert_eq!(record.locale(), "ru");
        assert!(!record.exists());
    }

    // ==================== fill_locale Tests ====================

    #[test]
    fn test_fill_locale_registers_new_record() {
        let mut translations = Translations::new();
        translations.fill_locale("en", values(&[("title", Some("Hi"))]), FIELDS);

        assert_eq!(translations.len(), 1);
        assert!(translations.pending_deletions().is_empty());
    }

    #[test]
    fn test_fill_locale_with_only_nulls_creates_nothing() {
        let mut translations = Translations::new();
        translations.fill_locale("en", values(&[("title", None)]), FIELDS);

        assert!(translations.is_empty());
        assert!(translations.pending_deletions().is_empty());
    }

    #[test]
    fn test_fill_locale_prunes_persisted_record() {
        let mut translations = Translations::from_records(vec![TranslationRecord::persisted(
            "en",
            values(&[("title", Some("Hi")), ("body", None)]),
        )]);

        translations.fill_locale("en", values(&[("title", None)]), FIELDS);

        assert!(translations.translation_for("en").is_none());
        assert_eq!(translations.pending_deletions().len(), 1);
        assert_eq!(translations.pending_deletions()[0].locale(), "en");
    }

    #[test]
    fn test_fill_locale_keeps_record_with_remaining_value() {
        let mut translations = Translations::from_records(vec![TranslationRecord::persisted(
            "en",
            values(&[("title", Some("Hi")), ("body", Some("Text"))]),
        )]);

        translations.fill_locale("en", values(&[("title", None)]), FIELDS);

        let record = translations.translation_for("en").expect("record kept");
        assert_eq!(record.get("body"), Some("Text"));
        assert!(translations.pending_deletions().is_empty());
    }

    #[test]
    fn test_forget_deleted_only_drops_that_locale() {
        let mut translations = Translations::from_records(vec![
            TranslationRecord::persisted("en", values(&[("title", Some("Hi"))])),
            TranslationRecord::persisted("fr", values(&[("title", Some("Salut"))])),
        ]);
        translations.fill_locale("en", values(&[("title", None)]), FIELDS);
        translations.fill_locale("fr", values(&[("title", None)]), FIELDS);

        translations.forget_deleted("en");

        assert_eq!(translations.pending_deletions().len(), 1);
        assert_eq!(translations.pending_deletions()[0].locale(), "fr");
    }

    // ==================== prune_blank Tests ====================

    #[test]
    fn test_prune_blank_drops_new_empty_records() {
        let mut translations = Translations::new();
        translations.get_or_create("fr");
        translations.fill_locale("en", values(&[("title", Some("Hi"))]), FIELDS);

        translations.prune_blank(FIELDS);

        assert_eq!(translations.len(), 1);
        assert!(translations.translation_for("fr").is_none());
        assert!(translations.pending_deletions().is_empty());
    }

    #[test]
    fn test_prune_blank_queues_persisted_records() {
        let mut translations = Translations::from_records(vec![TranslationRecord::persisted(
            "en",
            values(&[("title", Some("Hi"))]),
        )]);
        translations.get_or_create("en").set("title", None);

        translations.prune_blank(FIELDS);

        assert!(translations.is_empty());
        assert_eq!(translations.pending_deletions().len(), 1);
    }
}
