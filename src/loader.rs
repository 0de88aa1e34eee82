//! One-shot catalog loading.
//!
//! A `CatalogLoader` owns a fetch capability and performs at most one fetch
//! in its lifetime. The first `load()` fetches, parses, normalizes and
//! indexes the document; every later call hands back the same outcome,
//! including a failure. Nothing here retries.

use crate::catalog::{CatalogIndex, parse_document};
use crate::error::LoadError;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Raw result of a fetch: status code and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Capability that retrieves the catalog document.
///
/// `Err` means the fetch could not complete at all; a completed request
/// with a bad status is an `Ok` response carrying that status.
pub trait CatalogFetch: Send + Sync {
    fn fetch(&self) -> Result<FetchResponse>;

    /// Where the document comes from, for logs and error messages.
    fn describe(&self) -> String;
}

impl<F: CatalogFetch + ?Sized> CatalogFetch for Box<F> {
    fn fetch(&self) -> Result<FetchResponse> {
        (**self).fetch()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Reads the catalog from a local file.
#[derive(Debug, Clone)]
pub struct FileFetch {
    path: PathBuf,
}

impl FileFetch {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogFetch for FileFetch {
    fn fetch(&self) -> Result<FetchResponse> {
        let body =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        Ok(FetchResponse::ok(body))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fetches the catalog over HTTP(S) with a blocking client.
#[derive(Debug, Clone)]
pub struct HttpFetch {
    url: String,
    timeout: Duration,
}

impl HttpFetch {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl CatalogFetch for HttpFetch {
    fn fetch(&self) -> Result<FetchResponse> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("building HTTP client")?;
        let response = client
            .get(&self.url)
            .send()
            .with_context(|| format!("requesting {}", self.url))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .with_context(|| format!("reading response body from {}", self.url))?;
        Ok(FetchResponse {
            status,
            body: body.to_vec(),
        })
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Memoizing loader around a fetch capability.
pub struct CatalogLoader<F> {
    fetch: F,
    outcome: OnceLock<Result<Arc<CatalogIndex>, LoadError>>,
}

impl<F: CatalogFetch> CatalogLoader<F> {
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            outcome: OnceLock::new(),
        }
    }

    /// Load the catalog, fetching on the first call only.
    pub fn load(&self) -> Result<Arc<CatalogIndex>, LoadError> {
        self.outcome.get_or_init(|| self.fetch_and_index()).clone()
    }

    /// Whether a load (successful or not) has already happened.
    pub fn is_loaded(&self) -> bool {
        self.outcome.get().is_some()
    }

    fn fetch_and_index(&self) -> Result<Arc<CatalogIndex>, LoadError> {
        let source = self.fetch.describe();
        let outcome = self.fetch.fetch().map_err(|err| LoadError::Fetch {
            detail: format!("{err:#}"),
        });
        let result = outcome.and_then(|response| index_response(&response));
        match &result {
            Ok(index) => {
                let summary = index.summary();
                tracing::info!(
                    %source,
                    datasets = summary.datasets,
                    attributes = summary.attributes,
                    skipped = summary.skipped_records,
                    "loaded catalog"
                );
            }
            Err(err) => {
                tracing::warn!(%source, reason = err.reason(), error = %err, "catalog load failed");
            }
        }
        result
    }
}

/// Turn a completed fetch into an index, enforcing status and shape.
pub fn index_response(response: &FetchResponse) -> Result<Arc<CatalogIndex>, LoadError> {
    if !response.is_success() {
        return Err(LoadError::HttpStatus {
            status: response.status,
        });
    }
    let raw = parse_document(&response.body)?;
    Ok(Arc::new(CatalogIndex::from_raw(raw)))
}
