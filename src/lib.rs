//! Translation catalogs for the BrainFrame client.
//!
//! Loads Qt Linguist `.ts` documents and resolves
//! `(context, source text, disambiguation comment)` keys to display text.

pub mod config;
pub mod errors;
pub mod i18n;
pub mod models;

pub use errors::{CatalogError, CatalogResult, LookupMiss};
pub use i18n::loader::{parse_ts, CatalogLoader, LoadReport, MissingFieldPolicy};
pub use i18n::locale::Locale;
pub use i18n::lookup::{DisplayText, MessageKey, TextOrigin, Translator};
pub use i18n::{CatalogDirectory, CatalogSelection, I18n};
pub use models::{Catalog, CompletionState, Context, Location, Message};
