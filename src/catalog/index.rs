//! Cross-reference index between datasets and attributes.
//!
//! The index is built once from normalized records and never mutated
//! afterwards. Each attribute entry aggregates every dataset that declares
//! or references it: scalar fields merge first-non-empty-wins, nullability
//! only tightens, examples and domain values are deduplicated, and the raw
//! per-dataset definitions are kept verbatim for conflict reporting.
//! Any change to the dataset collection means building a new index.

use crate::catalog::diagnostics::{Diagnostics, SkippedRecord};
use crate::catalog::identity::{AttributeKey, DatasetId, Nullability};
use crate::catalog::model::{
    Attribute, AttributeDecl, AttributeDefinition, Dataset, DatasetRef, DomainValue,
};
use crate::catalog::normalize::{NormalizedCatalog, normalize_catalog};
use crate::catalog::raw::RawCatalog;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
/// Immutable catalog index: datasets in document order plus the attribute table.
///
/// Read it through the query methods; the maps themselves stay private.
pub struct CatalogIndex {
    pub(crate) datasets: Vec<Dataset>,
    pub(crate) by_id: BTreeMap<DatasetId, usize>,
    pub(crate) attributes: BTreeMap<AttributeKey, Attribute>,
    pub(crate) diagnostics: Diagnostics,
}

impl CatalogIndex {
    /// Normalize and index a raw catalog.
    pub fn from_raw(raw: RawCatalog) -> Self {
        Self::from_normalized(normalize_catalog(raw))
    }

    /// Index already normalized records.
    ///
    /// Dataset ids are expected to be unique (the normalizer guarantees it);
    /// if a caller passes duplicates anyway, the first one owns the id.
    pub fn from_normalized(normalized: NormalizedCatalog) -> Self {
        let NormalizedCatalog {
            datasets,
            attributes: table,
            mut diagnostics,
        } = normalized;

        let attributes = build_attribute_index(&table, &datasets, &mut diagnostics);

        let mut by_id = BTreeMap::new();
        for (position, dataset) in datasets.iter().enumerate() {
            by_id.entry(dataset.id.clone()).or_insert(position);
        }

        tracing::debug!(
            datasets = datasets.len(),
            attributes = attributes.len(),
            skipped = diagnostics.len(),
            "built catalog index"
        );

        Self {
            datasets,
            by_id,
            attributes,
            diagnostics,
        }
    }

    /// Records skipped while normalizing and indexing.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

/// Merge state for one attribute while datasets are being folded in.
struct AttributeEntry {
    name: AttributeKey,
    label: Option<String>,
    data_type: Option<String>,
    description: Option<String>,
    nullable: Nullability,
    examples: BTreeSet<String>,
    domain_values: Vec<DomainValue>,
    datasets: Vec<DatasetRef>,
    definitions: Vec<AttributeDefinition>,
}

impl AttributeEntry {
    fn new(name: AttributeKey) -> Self {
        Self {
            name,
            label: None,
            data_type: None,
            description: None,
            nullable: Nullability::Unknown,
            examples: BTreeSet::new(),
            domain_values: Vec::new(),
            datasets: Vec::new(),
            definitions: Vec::new(),
        }
    }

    /// Fold the catalog-level facts of a declaration into the entry.
    fn absorb(&mut self, decl: &AttributeDecl) {
        fill_once(&mut self.label, &decl.label);
        fill_once(&mut self.data_type, &decl.data_type);
        fill_once(&mut self.description, &decl.description);
        self.nullable = self.nullable.merge(decl.nullable);
        self.examples.extend(decl.examples.iter().cloned());
        self.domain_values.extend(decl.domain.iter().cloned());
    }

    /// Record that `dataset` uses this attribute, with whatever it declared.
    fn link(&mut self, dataset: &Dataset, decl: Option<&AttributeDecl>) {
        self.datasets.push(dataset.to_ref());
        self.definitions.push(AttributeDefinition {
            dataset_id: dataset.id.clone(),
            dataset_title: dataset.title.clone(),
            data_type: decl.and_then(|decl| decl.data_type.clone()),
            description: decl.and_then(|decl| decl.description.clone()),
        });
    }

    fn finalize(self) -> Attribute {
        let label = self.label.unwrap_or_else(|| self.name.0.clone());
        Attribute {
            label,
            data_type: self.data_type,
            description: self.description,
            nullable: self.nullable,
            examples: self.examples.into_iter().collect(),
            domain_values: dedup_domain_values(self.domain_values),
            datasets: self.datasets,
            definitions: self.definitions,
            name: self.name,
        }
    }
}

/// Build the attribute table from an optional top-level attribute table and
/// the datasets' declarations and references.
///
/// Table entries seed canonical fields before any dataset is folded in but
/// add no back-references. Datasets are then processed in order; for each
/// key in `attribute_ids` that resolves to a known attribute the dataset is
/// linked exactly once, merging its inline declaration when it has one.
/// Keys nothing defines are reported as `DanglingReference`.
pub fn build_attribute_index(
    table: &[AttributeDecl],
    datasets: &[Dataset],
    diagnostics: &mut Diagnostics,
) -> BTreeMap<AttributeKey, Attribute> {
    let mut entries: BTreeMap<AttributeKey, AttributeEntry> = BTreeMap::new();

    for decl in table {
        entries
            .entry(decl.name.clone())
            .or_insert_with(|| AttributeEntry::new(decl.name.clone()))
            .absorb(decl);
    }

    // Inline declarations make an attribute exist even for datasets that
    // only reference it by id.
    for dataset in datasets {
        for decl in &dataset.attributes {
            entries
                .entry(decl.name.clone())
                .or_insert_with(|| AttributeEntry::new(decl.name.clone()));
        }
    }

    let mut linked: BTreeSet<(AttributeKey, DatasetId)> = BTreeSet::new();
    for dataset in datasets {
        for key in &dataset.attribute_ids {
            let Some(entry) = entries.get_mut(key) else {
                diagnostics.push(SkippedRecord::DanglingReference {
                    dataset: dataset.id.clone(),
                    attribute: key.clone(),
                });
                continue;
            };
            if !linked.insert((key.clone(), dataset.id.clone())) {
                continue;
            }
            let decl = dataset.declaration(key);
            if let Some(decl) = decl {
                entry.absorb(decl);
            }
            entry.link(dataset, decl);
        }
    }

    entries
        .into_iter()
        .map(|(key, entry)| (key, entry.finalize()))
        .collect()
}

fn fill_once(slot: &mut Option<String>, candidate: &Option<String>) {
    if slot.as_deref().is_none_or(str::is_empty) {
        if let Some(value) = candidate.as_deref().filter(|value| !value.is_empty()) {
            *slot = Some(value.to_string());
        }
    }
}

/// Drop repeated `(value, label)` pairs, keeping first occurrences in order.
fn dedup_domain_values(values: Vec<DomainValue>) -> Vec<DomainValue> {
    let mut seen: BTreeSet<(String, String)> = BTreeSet::new();
    values
        .into_iter()
        .filter(|value| {
            let (v, l) = value.dedup_key();
            seen.insert((v.to_string(), l.to_string()))
        })
        .collect()
}
