//! Per-locale translation records and the logic merging them with their owner.
//!
//! - `record`: one (owner, locale) set of translated values
//! - `collection`: an owner's records, at most one per locale
//! - `merge`: payload extraction, fallback lookup and aggregation
//! - `translatable`: the trait owners implement

mod collection;
mod merge;
mod record;
mod translatable;

pub use collection::Translations;
pub use merge::{
    all_localized_values, effective_values, extract_translations, resolve_translation,
    LocaleValues,
};
pub use record::TranslationRecord;
pub use translatable::Translatable;
