//! Where the catalog document lives.
//!
//! Resolution order: an explicit value (the CLI `--source` flag), then the
//! `CATALOG_SOURCE` environment variable, then the well-known relative path
//! `data/catalog.json`. Values starting with `http://` or `https://` are
//! fetched over HTTP; anything else is a filesystem path.

use crate::loader::{CatalogFetch, CatalogLoader, FileFetch, HttpFetch};
use std::env;
use std::fmt;
use std::path::PathBuf;

pub const SOURCE_ENV: &str = "CATALOG_SOURCE";
pub const DEFAULT_CATALOG_PATH: &str = "data/catalog.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Url(String),
}

impl CatalogSource {
    /// Classify a raw location string.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            CatalogSource::Url(trimmed.to_string())
        } else {
            CatalogSource::File(PathBuf::from(trimmed))
        }
    }

    /// Resolve the source from an explicit value, the environment, or the default.
    pub fn resolve(explicit: Option<&str>) -> Self {
        let from_env = env::var(SOURCE_ENV).ok();
        Self::resolve_with(explicit, from_env.as_deref())
    }

    fn resolve_with(explicit: Option<&str>, from_env: Option<&str>) -> Self {
        [explicit, from_env]
            .into_iter()
            .flatten()
            .find(|value| !value.trim().is_empty())
            .map(Self::parse)
            .unwrap_or_else(|| CatalogSource::File(PathBuf::from(DEFAULT_CATALOG_PATH)))
    }

    pub fn fetcher(&self) -> Box<dyn CatalogFetch> {
        match self {
            CatalogSource::File(path) => Box::new(FileFetch::new(path.clone())),
            CatalogSource::Url(url) => Box::new(HttpFetch::new(url.clone())),
        }
    }

    pub fn loader(&self) -> CatalogLoader<Box<dyn CatalogFetch>> {
        CatalogLoader::new(self.fetcher())
    }
}

impl Default for CatalogSource {
    fn default() -> Self {
        CatalogSource::File(PathBuf::from(DEFAULT_CATALOG_PATH))
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::File(path) => write!(f, "{}", path.display()),
            CatalogSource::Url(url) => f.write_str(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_and_paths_are_distinguished() {
        assert_eq!(
            CatalogSource::parse("https://example.org/catalog.json"),
            CatalogSource::Url("https://example.org/catalog.json".to_string())
        );
        assert_eq!(
            CatalogSource::parse(" ./catalog.json "),
            CatalogSource::File(PathBuf::from("./catalog.json"))
        );
    }

    #[test]
    fn explicit_beats_environment_beats_default() {
        assert_eq!(
            CatalogSource::resolve_with(Some("a.json"), Some("b.json")),
            CatalogSource::File(PathBuf::from("a.json"))
        );
        assert_eq!(
            CatalogSource::resolve_with(Some("  "), Some("http://host/c.json")),
            CatalogSource::Url("http://host/c.json".to_string())
        );
        assert_eq!(CatalogSource::resolve_with(None, Some("")), CatalogSource::default());
    }
}
