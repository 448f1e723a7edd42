use crate::errors::{CatalogError, CatalogResult};
use crate::i18n::loader::MissingFieldPolicy;
use crate::i18n::locale::Locale;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Interface language tag such as "zh" or "zh_CN". Unset means the system
    /// locale.
    #[serde(default)]
    pub language: Option<String>,
    /// Language tried when no catalog exists for `language`.
    #[serde(default = "default_fallback_language")]
    pub fallback_language: String,
    /// Directory holding the `.ts` catalogs.
    #[serde(default)]
    pub i18n_dir: Option<PathBuf>,
    /// File name prefix, catalogs are named `<prefix>_<locale>.ts`.
    #[serde(default = "default_catalog_prefix")]
    pub catalog_prefix: String,
    /// Fail the load on malformed entries instead of dropping them.
    #[serde(default)]
    pub strict: bool,
}

fn default_fallback_language() -> String {
    "en".to_string()
}

fn default_catalog_prefix() -> String {
    "brainframe".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: None,
            fallback_language: default_fallback_language(),
            i18n_dir: None,
            catalog_prefix: default_catalog_prefix(),
            strict: false,
        }
    }
}

impl Config {
    /// Load the user configuration. A missing file means the defaults; nothing
    /// is written.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Like [`Config::load`], writing the defaults to `path` on first run.
    pub fn init_at(path: &Path) -> Result<Self> {
        if !path.exists() {
            Config::default().save_to(path)?;
            info!(path = %path.display(), "Default configuration written");
        }
        Self::load_from(path)
    }

    /// Defaults, then the TOML file at `path` (if present), then `TSCAT_*`
    /// environment variables.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Config::default())?)
            .add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(::config::Environment::with_prefix("TSCAT").try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tscat");
        Ok(config_dir.join("config.toml"))
    }

    /// Directory with the catalogs. Falls back to the user data directory.
    pub fn i18n_directory_path(&self) -> PathBuf {
        self.i18n_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tscat")
                .join("i18n")
        })
    }

    /// The configured interface language, `None` when unset.
    pub fn locale(&self) -> CatalogResult<Option<Locale>> {
        self.language
            .as_deref()
            .map(|tag| parse_tag("language", tag))
            .transpose()
    }

    pub fn fallback_locale(&self) -> CatalogResult<Locale> {
        parse_tag("fallback_language", &self.fallback_language)
    }

    pub fn missing_field_policy(&self) -> MissingFieldPolicy {
        if self.strict {
            MissingFieldPolicy::Reject
        } else {
            MissingFieldPolicy::Drop
        }
    }
}

fn parse_tag(key: &str, tag: &str) -> CatalogResult<Locale> {
    Locale::parse(tag)
        .ok_or_else(|| CatalogError::Config(format!("{key} = {tag:?} is not a locale tag")))
}
