//! Per-locale translations for domain entities.
//!
//! Translatable fields of an entity are stored one row per locale in a
//! companion `<table>_translations` table. This crate extracts locale-keyed
//! payloads into those rows, resolves the locale to show (with region and
//! global fallbacks), persists rows through a `TranslationStore` and
//! provides axum middleware that picks the locale of each request.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `i18n` - Locale registry, resolver and request context
//! - `translation` - Records, merge logic and the `Translatable` trait
//! - `store` - Persistence seam and an in-memory store
//! - `db` - PostgreSQL store
//! - `middleware` - Request locale resolution for axum

pub mod config;
pub mod db;
pub mod error;
pub mod i18n;
pub mod middleware;
pub mod store;
pub mod translation;
mod yalt;

pub use error::{Result, YaltError};
pub use i18n::{LocaleContext, LocaleRegistry, LocaleResolver};
pub use store::{load_translations, save_translations, MemoryTranslationStore, TranslationStore};
pub use translation::{Translatable, TranslationRecord, Translations};
pub use yalt::Yalt;
