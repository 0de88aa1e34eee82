//! Records the normalizer and index builder dropped instead of failing on.
//!
//! The catalog is a hand-maintained JSON file, so imperfect entries are
//! skipped and indexing continues. Each skip is kept here so callers and
//! tests can see exactly what was left out.

use crate::catalog::identity::{AttributeKey, DatasetId};
use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkippedRecord {
    /// A dataset or attribute table entry that was not a JSON object.
    NonObjectRecord { table: &'static str, position: usize },
    /// A later dataset reusing an id already taken by an earlier one.
    DuplicateDataset { id: DatasetId, position: usize },
    /// An attribute declaration with neither `name` nor `id`.
    UnnamedAttribute {
        dataset: Option<DatasetId>,
        position: usize,
    },
    /// A second inline declaration of the same attribute within one dataset.
    DuplicateDeclaration {
        dataset: DatasetId,
        attribute: AttributeKey,
    },
    /// A domain entry that is neither a scalar nor an object with a value.
    UnrecognizedDomainEntry {
        attribute: AttributeKey,
        position: usize,
    },
    /// An `attribute_ids` entry naming an attribute nothing defines.
    DanglingReference {
        dataset: DatasetId,
        attribute: AttributeKey,
    },
}

impl fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkippedRecord::NonObjectRecord { table, position } => {
                write!(f, "{table}[{position}] is not an object")
            }
            SkippedRecord::DuplicateDataset { id, position } => {
                write!(f, "dataset '{id}' at position {position} repeats an earlier id")
            }
            SkippedRecord::UnnamedAttribute { dataset, position } => match dataset {
                Some(dataset) => write!(
                    f,
                    "attribute {position} of dataset '{dataset}' has no name or id"
                ),
                None => write!(f, "attribute table entry {position} has no name or id"),
            },
            SkippedRecord::DuplicateDeclaration { dataset, attribute } => write!(
                f,
                "dataset '{dataset}' declares attribute '{attribute}' more than once"
            ),
            SkippedRecord::UnrecognizedDomainEntry {
                attribute,
                position,
            } => write!(
                f,
                "domain entry {position} of attribute '{attribute}' has an unrecognized shape"
            ),
            SkippedRecord::DanglingReference { dataset, attribute } => write!(
                f,
                "dataset '{dataset}' references unknown attribute '{attribute}'"
            ),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
/// Ordered side list of skipped records.
pub struct Diagnostics {
    skipped: Vec<SkippedRecord>,
}

impl Diagnostics {
    pub fn push(&mut self, record: SkippedRecord) {
        tracing::debug!(%record, "skipping catalog record");
        self.skipped.push(record);
    }

    pub fn records(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn dangling_references(&self) -> impl Iterator<Item = &SkippedRecord> {
        self.skipped
            .iter()
            .filter(|record| matches!(record, SkippedRecord::DanglingReference { .. }))
    }
}
