//! Dataset/attribute catalog model and index.
//!
//! `raw` decides the document shape, `normalize` applies defaults, `index`
//! builds the cross-reference table and `query` is the read API on top of
//! it. `conflict` and `diagnostics` hold the derived, non-fatal facts.

pub mod conflict;
pub mod diagnostics;
pub mod identity;
pub mod index;
pub mod model;
pub mod normalize;
pub mod query;
pub mod raw;

pub use conflict::AttributeConflicts;
pub use diagnostics::{Diagnostics, SkippedRecord};
pub use identity::{AttributeKey, DatasetId, EntityKind, Nullability};
pub use index::{CatalogIndex, build_attribute_index};
pub use model::{Attribute, AttributeDecl, AttributeDefinition, Dataset, DatasetRef, DomainValue};
pub use normalize::{NormalizedCatalog, UNTITLED_DATASET, normalize_catalog};
pub use query::{CatalogSummary, ConflictReport, attribute_haystack, dataset_haystack};
pub use raw::{RawCatalog, RawDocument, parse_document};
