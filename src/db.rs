use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder, Row};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::{Result, YaltError};
use crate::store::{TranslationStore, TranslationTable};
use crate::translation::{Translatable, TranslationRecord};
use crate::Yalt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One ordering rule: a translated field read in one locale.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranslationOrder {
    pub field: String,
    pub locale: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl TranslationOrder {
    pub fn new(field: impl Into<String>, locale: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            locale: locale.into(),
            direction,
        }
    }
}

/// PostgreSQL-backed translation store.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Owner ids of `E` ordered by a translated column in one locale.
    ///
    /// Owners without a record in `locale` are left out.
    pub async fn ids_ordered_by_translation<E: Translatable>(
        &self,
        yalt: &Yalt,
        field: &str,
        locale: &str,
        direction: SortDirection,
    ) -> Result<Vec<i64>> {
        self.ids_ordered_by_translations::<E>(yalt, &[TranslationOrder::new(field, locale, direction)])
            .await
    }

    /// Owner ids of `E` ordered by several translated columns, each rule
    /// in its own locale. Rules apply in the given order; ties end on the
    /// owner key. Owners missing a record for any rule's locale are left out.
    pub async fn ids_ordered_by_translations<E: Translatable>(
        &self,
        yalt: &Yalt,
        orders: &[TranslationOrder],
    ) -> Result<Vec<i64>> {
        let table = TranslationTable::of::<E>(yalt)?;
        let mut query = order_by_translations_query::<E>(&table, orders)?;

        let rows = query.build().fetch_all(&self.pool).await?;
        let ids = rows
            .iter()
            .map(|row| row.try_get::<i64, _>(0))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Ordered {} {} by {} translated fields", ids.len(), E::TABLE, orders.len());
        Ok(ids)
    }
}

impl TranslationStore for Database {
    async fn load(&self, table: &TranslationTable, owner_id: i64) -> Result<Vec<TranslationRecord>> {
        let rows = load_query(table, owner_id).build().fetch_all(&self.pool).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let locale: String = row.try_get(0)?;
            let mut values = BTreeMap::new();
            for (index, field) in table.fields.iter().enumerate() {
                values.insert(field.to_string(), row.try_get::<Option<String>, _>(index + 1)?);
            }
            records.push(TranslationRecord::persisted(locale, values));
        }

        debug!("Loaded {} rows from {} for {}", records.len(), table.table, owner_id);
        Ok(records)
    }

    async fn upsert(
        &self,
        table: &TranslationTable,
        owner_id: i64,
        record: &TranslationRecord,
    ) -> Result<()> {
        upsert_query(table, owner_id, record)
            .build()
            .execute(&self.pool)
            .await?;

        debug!("Upserted {} translation in {} for {}", record.locale(), table.table, owner_id);
        Ok(())
    }

    async fn delete(&self, table: &TranslationTable, owner_id: i64, locale: &str) -> Result<bool> {
        let result = delete_query(table, owner_id, locale)
            .build()
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Identifiers reaching these builders were validated by `TranslationTable::of`.
fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}

fn load_query(table: &TranslationTable, owner_id: i64) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT ");
    query.push(quote(&table.locale_key));
    for field in table.fields {
        query.push(", ").push(quote(field));
    }
    query
        .push(" FROM ")
        .push(quote(&table.table))
        .push(" WHERE ")
        .push(quote(&table.foreign_key))
        .push(" = ")
        .push_bind(owner_id)
        .push(" ORDER BY ")
        .push(quote(&table.locale_key));
    query
}

fn upsert_query(
    table: &TranslationTable,
    owner_id: i64,
    record: &TranslationRecord,
) -> QueryBuilder<'static, Postgres> {
    // Only the fields the record carries, so a partial record never nulls
    // out columns it did not touch
    let fields: Vec<&str> = table
        .fields
        .iter()
        .copied()
        .filter(|field| record.has(field))
        .collect();

    let mut query = QueryBuilder::new("INSERT INTO ");
    query
        .push(quote(&table.table))
        .push(" (")
        .push(quote(&table.foreign_key))
        .push(", ")
        .push(quote(&table.locale_key));
    for field in &fields {
        query.push(", ").push(quote(field));
    }

    query
        .push(") VALUES (")
        .push_bind(owner_id)
        .push(", ")
        .push_bind(record.locale().to_string());
    for field in &fields {
        query
            .push(", ")
            .push_bind(record.get(field).map(str::to_string));
    }

    query
        .push(") ON CONFLICT (")
        .push(quote(&table.foreign_key))
        .push(", ")
        .push(quote(&table.locale_key))
        .push(")");

    if fields.is_empty() {
        query.push(" DO NOTHING");
    } else {
        query.push(" DO UPDATE SET ");
        for (index, field) in fields.iter().enumerate() {
            if index > 0 {
                query.push(", ");
            }
            query
                .push(quote(field))
                .push(" = EXCLUDED.")
                .push(quote(field));
        }
    }

    query
}

fn delete_query(
    table: &TranslationTable,
    owner_id: i64,
    locale: &str,
) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("DELETE FROM ");
    query
        .push(quote(&table.table))
        .push(" WHERE ")
        .push(quote(&table.foreign_key))
        .push(" = ")
        .push_bind(owner_id)
        .push(" AND ")
        .push(quote(&table.locale_key))
        .push(" = ")
        .push_bind(locale.to_string());
    query
}

fn order_by_translations_query<E: Translatable>(
    table: &TranslationTable,
    orders: &[TranslationOrder],
) -> Result<QueryBuilder<'static, Postgres>> {
    if let Some(order) = orders.iter().find(|order| !E::is_translatable(&order.field)) {
        return Err(YaltError::NotTranslatable(order.field.clone()));
    }
    for name in [E::TABLE, E::KEY_NAME] {
        if !crate::config::is_identifier(name) {
            return Err(YaltError::InvalidIdentifier(name.to_string()));
        }
    }

    let owner_key = format!("{}.{}", quote(E::TABLE), quote(E::KEY_NAME));

    let mut query = QueryBuilder::new("SELECT ");
    query.push(&owner_key).push(" FROM ").push(quote(E::TABLE));

    // One join per rule so each rule can read its own locale
    for (index, order) in orders.iter().enumerate() {
        let alias = quote(&format!("t{}", index));
        query
            .push(" JOIN ")
            .push(quote(&table.table))
            .push(" AS ")
            .push(&alias)
            .push(" ON ")
            .push(&owner_key)
            .push(" = ")
            .push(format!("{}.{}", alias, quote(&table.foreign_key)))
            .push(" AND ")
            .push(format!("{}.{}", alias, quote(&table.locale_key)))
            .push(" = ")
            .push_bind(order.locale.clone());
    }

    query.push(" ORDER BY ");
    for (index, order) in orders.iter().enumerate() {
        query
            .push(format!("{}.{}", quote(&format!("t{}", index)), quote(&order.field)))
            .push(" ")
            .push(order.direction.as_sql())
            .push(", ");
    }
    query.push(&owner_key);

    Ok(query)
}
