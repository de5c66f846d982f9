//! Locale handling.
//!
//! # Architecture
//!
//! - `registry`: the configured set of valid locale codes, memoized once
//! - `resolver`: fallback derivation and request locale precedence
//! - `context`: the per-request current locale, passed explicitly
//!
//! # Example
//!
//! ```rust,ignore
//! use yalt::i18n::{LocaleRegistry, LocaleResolver};
//!
//! let registry = LocaleRegistry::from_config(&config);
//! let resolver = LocaleResolver::from_config(&config);
//!
//! assert!(registry.is_valid_locale("en-US"));
//! assert_eq!(resolver.fallback_for("en-US").as_deref(), Some("en"));
//! ```

mod context;
mod registry;
mod resolver;

pub use context::LocaleContext;
pub use registry::LocaleRegistry;
pub use resolver::{parse_accept_language, LocaleResolver, ResolvedLocale};
