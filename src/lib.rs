//! Catalog index for dataset/attribute JSON documents.
//!
//! The crate loads one catalog document, normalizes its records, and builds
//! an immutable cross-reference index between datasets ("objects") and the
//! attributes they declare. Callers read it through the query methods on
//! [`CatalogIndex`] and derive change-request payloads with
//! [`change_request`]. Only [`LoadError`] is fatal; malformed individual
//! records are skipped and listed in the index diagnostics.

pub mod catalog;
pub mod change_request;
pub mod config;
pub mod error;
pub mod loader;
mod schema;

pub use catalog::{
    Attribute, AttributeConflicts, AttributeDecl, AttributeDefinition, AttributeKey,
    CatalogIndex, CatalogSummary, ConflictReport, Dataset, DatasetId, DatasetRef, Diagnostics,
    DomainValue, EntityKind, Nullability, RawCatalog, SkippedRecord, UNTITLED_DATASET,
    parse_document,
};
pub use change_request::{AttributeDraft, ChangeRequest, FieldChange, RequestKind, compact, diff};
pub use config::CatalogSource;
pub use error::LoadError;
pub use loader::{
    CatalogFetch, CatalogLoader, FetchResponse, FileFetch, HttpFetch, index_response,
};
