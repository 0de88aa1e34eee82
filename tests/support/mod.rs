use anyhow::Result;
use catalog_index::{CatalogLoader, FileFetch};
use serde_json::Value;
use std::io::Write;
use tempfile::NamedTempFile;

/// Write `document` to a temp file and return it with a loader pointed at it.
///
/// The file handle must outlive the loader's first `load()`.
pub fn catalog_file(document: &Value) -> Result<(NamedTempFile, CatalogLoader<FileFetch>)> {
    let mut file = NamedTempFile::new()?;
    serde_json::to_writer(&mut file, document)?;
    file.flush()?;
    let loader = CatalogLoader::new(FileFetch::new(file.path()));
    Ok((file, loader))
}

pub fn raw_catalog_file(body: &str) -> Result<(NamedTempFile, CatalogLoader<FileFetch>)> {
    let mut file = NamedTempFile::new()?;
    file.write_all(body.as_bytes())?;
    file.flush()?;
    let loader = CatalogLoader::new(FileFetch::new(file.path()));
    Ok((file, loader))
}
