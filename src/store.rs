//! Persistence of translation records.
//!
//! `TranslationStore` is the seam to the storage layer: anything that can
//! load, upsert and delete records keyed by (owner id, locale).
//! `save_translations` is what an owner's save path calls once the owner
//! row itself is written.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Mutex;

use tracing::debug;

use crate::config::is_identifier;
use crate::error::{Result, YaltError};
use crate::translation::{Translatable, TranslationRecord, Translations};
use crate::Yalt;

/// Where the translations of one owner type live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTable {
    pub table: String,
    pub foreign_key: String,
    pub locale_key: String,
    pub fields: &'static [&'static str],
}

impl TranslationTable {
    /// Describe the translations table of `E`, validating every identifier.
    pub fn of<E: Translatable + ?Sized>(yalt: &Yalt) -> Result<Self> {
        let table = Self {
            table: E::translations_table(),
            foreign_key: E::FOREIGN_KEY.to_string(),
            locale_key: E::locale_key().unwrap_or(yalt.locale_key()).to_string(),
            fields: E::TRANSLATABLE,
        };

        for name in [&table.table, &table.foreign_key, &table.locale_key]
            .into_iter()
            .map(String::as_str)
            .chain(table.fields.iter().copied())
        {
            if !is_identifier(name) {
                return Err(YaltError::InvalidIdentifier(name.to_string()));
            }
        }

        Ok(table)
    }
}

pub trait TranslationStore: Send + Sync {
    /// Every record of one owner.
    fn load(
        &self,
        table: &TranslationTable,
        owner_id: i64,
    ) -> impl Future<Output = Result<Vec<TranslationRecord>>> + Send;

    /// Create or update the record keyed by (owner id, record locale).
    fn upsert(
        &self,
        table: &TranslationTable,
        owner_id: i64,
        record: &TranslationRecord,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Returns whether a record was removed.
    fn delete(
        &self,
        table: &TranslationTable,
        owner_id: i64,
        locale: &str,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// Replace the entity's translations with the ones stored for it.
pub async fn load_translations<E, S>(entity: &mut E, store: &S, yalt: &Yalt) -> Result<()>
where
    E: Translatable + ?Sized,
    S: TranslationStore,
{
    let owner_id = entity.key().ok_or(YaltError::MissingOwnerKey)?;
    let table = TranslationTable::of::<E>(yalt)?;

    let records = store.load(&table, owner_id).await?;
    debug!("Loaded {} translations from {} for {}", records.len(), table.table, owner_id);

    *entity.translations_mut() = Translations::from_records(records);
    Ok(())
}

/// Persist the entity's translations after the entity itself was saved.
///
/// Blank records are pruned, pruned records are deleted, then every
/// remaining record is upserted and marked persisted. A deletion stays
/// queued until the store confirms it, so a failed save can be retried.
pub async fn save_translations<E, S>(entity: &mut E, store: &S, yalt: &Yalt) -> Result<()>
where
    E: Translatable + ?Sized,
    S: TranslationStore,
{
    let owner_id = entity.key().ok_or(YaltError::MissingOwnerKey)?;
    let table = TranslationTable::of::<E>(yalt)?;

    entity.translations_mut().prune_blank(E::TRANSLATABLE);

    let pending: Vec<String> = entity
        .translations()
        .pending_deletions()
        .iter()
        .map(|record| record.locale().to_string())
        .collect();
    for locale in pending {
        let deleted = store.delete(&table, owner_id, &locale).await?;
        entity.translations_mut().forget_deleted(&locale);
        debug!("Deleted {} translation of {} {}: {}", locale, table.table, owner_id, deleted);
    }

    for record in entity.translations_mut().iter_mut() {
        store.upsert(&table, owner_id, record).await?;
        record.mark_persisted();
    }

    debug!("Saved {} translations of {} {}", entity.translations().len(), table.table, owner_id);
    Ok(())
}

type RecordKey = (String, i64, String);

/// Store keeping records in process memory.
#[derive(Debug, Default)]
pub struct MemoryTranslationStore {
    rows: Mutex<HashMap<RecordKey, BTreeMap<String, Option<String>>>>,
}

impl MemoryTranslationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all tables.
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rows(&self) -> std::sync::MutexGuard<'_, HashMap<RecordKey, BTreeMap<String, Option<String>>>> {
        // A poisoned map is still consistent: every write is a single insert/remove
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TranslationStore for MemoryTranslationStore {
    async fn load(&self, table: &TranslationTable, owner_id: i64) -> Result<Vec<TranslationRecord>> {
        let rows = self.rows();
        let mut records: Vec<TranslationRecord> = rows
            .iter()
            .filter(|((t, owner, _), _)| t == &table.table && *owner == owner_id)
            .map(|((_, _, locale), values)| TranslationRecord::persisted(locale.clone(), values.clone()))
            .collect();
        records.sort_by(|a, b| a.locale().cmp(b.locale()));
        Ok(records)
    }

    async fn upsert(
        &self,
        table: &TranslationTable,
        owner_id: i64,
        record: &TranslationRecord,
    ) -> Result<()> {
        let key = (table.table.clone(), owner_id, record.locale().to_string());
        let mut rows = self.rows();
        let values = rows.entry(key).or_default();
        for field in table.fields {
            if let Some(value) = record.values().get(*field) {
                values.insert(field.to_string(), value.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &TranslationTable, owner_id: i64, locale: &str) -> Result<bool> {
        let key = (table.table.clone(), owner_id, locale.to_string());
        Ok(self.rows().remove(&key).is_some())
    }
}
