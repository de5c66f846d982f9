use thiserror::Error;

/// Errors raised while extracting, resolving or persisting translations.
#[derive(Error, Debug)]
pub enum YaltError {
    /// A translation payload used a locale missing from the registry
    #[error("Locale '{0}' is not supported")]
    UnsupportedLocale(String),

    /// A translatable field was given something other than a locale-keyed object,
    /// or a per-locale value that is neither a string nor null
    #[error("Translation '{field}' must be an object keyed by locale, '{value}' given")]
    TranslationShape { field: String, value: String },

    #[error("Field '{0}' is not translatable")]
    NotTranslatable(String),

    /// Translations are keyed by the owner id, so the owner must be saved first
    #[error("Owner has no key; save it before its translations")]
    MissingOwnerKey,

    #[error("'{0}' is not a valid SQL identifier")]
    InvalidIdentifier(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, YaltError>;
