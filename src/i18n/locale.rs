use std::fmt;
use std::path::{Path, PathBuf};

/// Catalog file extension.
pub const CATALOG_EXTENSION: &str = "ts";

/// A language with an optional territory, e.g. `zh` or `zh_CN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    territory: Option<String>,
}

impl Locale {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            territory: None,
        }
    }

    /// Parse POSIX (`zh_CN.UTF-8@pinyin`) or BCP 47 (`zh-CN`) style tags.
    /// `C` and `POSIX` mean English.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        let tag = tag.split(['.', '@']).next().unwrap_or(tag);
        if tag.is_empty() {
            return None;
        }
        if tag == "C" || tag == "POSIX" {
            return Some(Self::new("en"));
        }

        let mut parts = tag.split(['_', '-']);
        let language = parts.next()?;
        if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        let territory = parts
            .next()
            .filter(|t| !t.is_empty())
            .map(|t| t.to_ascii_uppercase());

        Some(Self {
            language: language.to_ascii_lowercase(),
            territory,
        })
    }

    /// Locale of the running process, from `LC_ALL`, `LC_MESSAGES` or `LANG`
    /// in that order. Defaults to English.
    pub fn system() -> Self {
        Self::from_env(|name| std::env::var(name).ok())
    }

    pub fn from_env(var: impl Fn(&str) -> Option<String>) -> Self {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|name| var(name))
            .find(|value| !value.trim().is_empty())
            .and_then(|value| Self::parse(&value))
            .unwrap_or_else(|| Self::new("en"))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn territory(&self) -> Option<&str> {
        self.territory.as_deref()
    }

    /// File names to try, most specific first: `<prefix>_zh_CN.ts`, then
    /// `<prefix>_zh.ts`.
    pub fn candidate_names(&self, prefix: &str) -> Vec<String> {
        let mut names = Vec::with_capacity(2);
        if let Some(territory) = &self.territory {
            names.push(format!(
                "{prefix}_{}_{territory}.{CATALOG_EXTENSION}",
                self.language
            ));
        }
        names.push(format!("{prefix}_{}.{CATALOG_EXTENSION}", self.language));
        names
    }

    /// First existing catalog for this locale in `dir`.
    pub fn find_catalog(&self, dir: &Path, prefix: &str) -> Option<PathBuf> {
        self.candidate_names(prefix)
            .into_iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.territory {
            Some(territory) => write!(f, "{}_{}", self.language, territory),
            None => write!(f, "{}", self.language),
        }
    }
}
