pub mod format;
pub mod loader;
pub mod locale;
pub mod lookup;
pub mod plural;
pub mod search;
pub mod writer;

use crate::config::Config;
use crate::errors::CatalogResult;
use crate::models::Catalog;
use loader::{CatalogLoader, MissingFieldPolicy};
use locale::Locale;
use lookup::Translator;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Where the active catalog came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSelection {
    /// A catalog for the requested locale.
    Requested(PathBuf),
    /// No catalog for the requested locale; the fallback language's catalog.
    Fallback(PathBuf),
    /// Nothing found; an empty catalog, so the UI shows source text.
    SourceOnly,
}

/// Finds catalog files for a locale and loads them.
#[derive(Debug, Clone)]
pub struct CatalogDirectory {
    dir: PathBuf,
    prefix: String,
    fallback: Locale,
    loader: CatalogLoader,
}

impl CatalogDirectory {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            fallback: Locale::new("en"),
            loader: CatalogLoader::default(),
        }
    }

    pub fn from_config(config: &Config) -> CatalogResult<Self> {
        Ok(
            Self::new(config.i18n_directory_path(), config.catalog_prefix.clone())
                .with_fallback(config.fallback_locale()?)
                .with_policy(config.missing_field_policy()),
        )
    }

    pub fn with_fallback(mut self, fallback: Locale) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_policy(mut self, policy: MissingFieldPolicy) -> Self {
        self.loader = CatalogLoader::new(policy);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Which file a load for `locale` would use, without parsing anything.
    pub fn select(&self, locale: &Locale) -> CatalogSelection {
        if let Some(path) = locale.find_catalog(&self.dir, &self.prefix) {
            return CatalogSelection::Requested(path);
        }
        if let Some(path) = self.fallback.find_catalog(&self.dir, &self.prefix) {
            return CatalogSelection::Fallback(path);
        }
        CatalogSelection::SourceOnly
    }

    /// Load the catalog for `locale`, falling back to the fallback language
    /// and finally to an empty source-language catalog. A file that exists but
    /// does not parse is an error.
    pub fn load(&self, locale: &Locale) -> CatalogResult<(Catalog, CatalogSelection)> {
        let selection = self.select(locale);
        let catalog = match &selection {
            CatalogSelection::Requested(path) => self.loader.load_path(path)?,
            CatalogSelection::Fallback(path) => {
                self.warn_missing(locale);
                self.loader.load_path(path)?
            }
            CatalogSelection::SourceOnly => {
                self.warn_missing(locale);
                debug!(dir = %self.dir.display(), "No catalogs found, showing source text");
                Catalog::source_only(self.fallback.language())
            }
        };
        Ok((catalog, selection))
    }

    fn warn_missing(&self, locale: &Locale) {
        if locale.language() != self.fallback.language() {
            warn!(
                "Unable to load translation file for [{}] locale. Using {} as a fallback.",
                locale, self.fallback
            );
        }
    }
}

/// Handle to the active catalog.
///
/// Readers take a [`snapshot`](I18n::snapshot) and keep using it for as long
/// as they like; switching language swaps in a whole new catalog and never
/// mutates the old one. The locale and its catalog change together under one
/// lock.
pub struct I18n {
    active: RwLock<Active>,
    directory: CatalogDirectory,
}

struct Active {
    locale: Locale,
    translator: Arc<Translator>,
}

impl I18n {
    pub fn new(directory: CatalogDirectory, locale: Locale) -> CatalogResult<Self> {
        let (catalog, selection) = directory.load(&locale)?;
        info!(%locale, ?selection, "Translator installed");
        Ok(Self {
            active: RwLock::new(Active {
                locale,
                translator: Arc::new(Translator::new(catalog)),
            }),
            directory,
        })
    }

    /// Startup path: configured language, or the system locale when unset.
    pub fn from_config(config: &Config) -> CatalogResult<Self> {
        let locale = config.locale()?.unwrap_or_else(Locale::system);
        Self::new(CatalogDirectory::from_config(config)?, locale)
    }

    pub fn snapshot(&self) -> Arc<Translator> {
        self.read().translator.clone()
    }

    pub fn get_language(&self) -> Locale {
        self.read().locale.clone()
    }

    /// The active locale together with the catalog loaded for it.
    pub fn current(&self) -> (Locale, Arc<Translator>) {
        let active = self.read();
        (active.locale.clone(), active.translator.clone())
    }

    /// Load the catalog for `locale` and make it the active one. On error the
    /// previous catalog stays active.
    pub fn set_language(&self, locale: Locale) -> CatalogResult<CatalogSelection> {
        let (catalog, selection) = self.directory.load(&locale)?;
        let translator = Arc::new(Translator::new(catalog));
        info!(%locale, ?selection, "Language switched");
        *self.write() = Active { locale, translator };
        Ok(selection)
    }

    /// Replace the active catalog, keeping the locale. Returns the previous
    /// catalog.
    pub fn install(&self, translator: Translator) -> Arc<Translator> {
        let mut active = self.write();
        std::mem::replace(&mut active.translator, Arc::new(translator))
    }

    fn read(&self) -> RwLockReadGuard<'_, Active> {
        self.active.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Active> {
        self.active.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Display text for a key, or the source text itself.
    pub fn t(&self, context: &str, source: &str) -> String {
        self.snapshot().tr(context, source, None).to_string()
    }

    /// [`I18n::t`] with a disambiguation comment.
    pub fn tc(&self, context: &str, source: &str, comment: &str) -> String {
        self.snapshot().tr(context, source, Some(comment)).to_string()
    }
}
