//! Read-only query façade over a built `CatalogIndex`.
//!
//! Every lookup is total: misses come back as `None` or an empty vector.
//! View code should only go through these methods.

use crate::catalog::conflict::AttributeConflicts;
use crate::catalog::identity::{AttributeKey, DatasetId};
use crate::catalog::index::CatalogIndex;
use crate::catalog::model::{Attribute, Dataset};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
/// Headline counts for a loaded catalog.
pub struct CatalogSummary {
    pub datasets: usize,
    pub attributes: usize,
    pub conflicted_attributes: usize,
    pub skipped_records: usize,
    pub dangling_references: usize,
}

#[derive(Debug, Clone, Serialize)]
/// An attribute whose definitions disagree, with the disagreeing values.
pub struct ConflictReport<'a> {
    pub attribute: &'a AttributeKey,
    #[serde(flatten)]
    pub conflicts: AttributeConflicts,
}

impl CatalogIndex {
    pub fn dataset(&self, id: &str) -> Option<&Dataset> {
        self.by_id
            .get(&DatasetId(id.to_string()))
            .and_then(|position| self.datasets.get(*position))
    }

    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes.get(&AttributeKey(key.to_string()))
    }

    /// Datasets in document order.
    pub fn datasets(&self) -> impl Iterator<Item = &Dataset> {
        self.datasets.iter()
    }

    /// Attributes in key order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// Resolve a dataset's `attribute_ids`, dropping ids with no attribute.
    pub fn attributes_for_dataset(&self, dataset: &Dataset) -> Vec<&Attribute> {
        dataset
            .attribute_ids
            .iter()
            .filter_map(|key| self.attributes.get(key))
            .collect()
    }

    /// Datasets that declare or reference the attribute, in first-seen order.
    pub fn datasets_for_attribute(&self, key: &str) -> Vec<&Dataset> {
        let Some(attribute) = self.attribute(key) else {
            return Vec::new();
        };
        let mut found: Vec<&Dataset> = Vec::with_capacity(attribute.datasets.len());
        for reference in &attribute.datasets {
            if let Some(dataset) = self.dataset(reference.id.as_str()) {
                if !found.iter().any(|existing| existing.id == dataset.id) {
                    found.push(dataset);
                }
            }
        }
        found
    }

    /// Datasets whose searchable text passes `predicate`.
    ///
    /// The predicate sees the lowercased haystack built by
    /// [`dataset_haystack`].
    pub fn filter_datasets_by<P>(&self, predicate: P) -> Vec<&Dataset>
    where
        P: Fn(&str) -> bool,
    {
        self.datasets
            .iter()
            .filter(|dataset| predicate(&dataset_haystack(dataset)))
            .collect()
    }

    /// Case-insensitive substring search over datasets. An empty query matches all.
    pub fn filter_datasets(&self, query: &str) -> Vec<&Dataset> {
        let needle = query.trim().to_lowercase();
        self.filter_datasets_by(|haystack| haystack.contains(&needle))
    }

    /// Attributes whose searchable text passes `predicate`.
    pub fn filter_attributes_by<P>(&self, predicate: P) -> Vec<&Attribute>
    where
        P: Fn(&str) -> bool,
    {
        self.attributes
            .values()
            .filter(|attribute| predicate(&attribute_haystack(attribute)))
            .collect()
    }

    /// Case-insensitive substring search over attributes. An empty query matches all.
    pub fn filter_attributes(&self, query: &str) -> Vec<&Attribute> {
        let needle = query.trim().to_lowercase();
        self.filter_attributes_by(|haystack| haystack.contains(&needle))
    }

    /// Attributes with a type or description conflict, recomputed per call.
    pub fn conflicts(&self) -> Vec<ConflictReport<'_>> {
        self.attributes
            .values()
            .filter_map(|attribute| {
                let conflicts = attribute.conflicts();
                conflicts.any().then_some(ConflictReport {
                    attribute: &attribute.name,
                    conflicts,
                })
            })
            .collect()
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            datasets: self.datasets.len(),
            attributes: self.attributes.len(),
            conflicted_attributes: self
                .attributes
                .values()
                .filter(|attribute| attribute.conflicts().any())
                .count(),
            skipped_records: self.diagnostics.len(),
            dangling_references: self.diagnostics.dangling_references().count(),
        }
    }
}

/// Lowercased id/title/description/topics/keywords, space-joined.
pub fn dataset_haystack(dataset: &Dataset) -> String {
    let mut parts: Vec<&str> = vec![dataset.id.as_str(), dataset.title.as_str()];
    parts.extend(dataset.description.as_deref());
    parts.extend(dataset.topics.iter().map(String::as_str));
    parts.extend(dataset.keywords.iter().map(String::as_str));
    parts.join(" ").to_lowercase()
}

/// Lowercased key/label/type/description/examples, space-joined.
pub fn attribute_haystack(attribute: &Attribute) -> String {
    let mut parts: Vec<&str> = vec![attribute.name.as_str(), attribute.label.as_str()];
    parts.extend(attribute.data_type.as_deref());
    parts.extend(attribute.description.as_deref());
    parts.extend(attribute.examples.iter().map(String::as_str));
    parts.join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::raw::RawCatalog;
    use serde_json::json;

    fn sample() -> CatalogIndex {
        CatalogIndex::from_raw(RawCatalog {
            objects: vec![
                json!({
                    "id": "parks",
                    "title": "City Parks",
                    "topics": ["Recreation"],
                    "attribute_ids": ["ghost"],
                    "attributes": [{"name": "area_sqkm", "type": "float"}, {"name": "park_name"}]
                }),
                json!({
                    "id": "trails",
                    "description": "Hiking TRAILS",
                    "keywords": ["paths"],
                    "attributes": [{"name": "area_sqkm", "type": "string", "nullable": false}]
                }),
            ],
            attributes: Vec::new(),
        })
    }

    #[test]
    fn lookups_are_total() {
        let idx = sample();
        assert_eq!(idx.dataset("parks").map(|d| d.title.as_str()), Some("City Parks"));
        assert!(idx.dataset("nope").is_none());
        assert!(idx.attribute("area_sqkm").is_some());
        assert!(idx.attribute("ghost").is_none());
        assert!(idx.datasets_for_attribute("ghost").is_empty());
    }

    #[test]
    fn attributes_for_dataset_drops_dangling_ids() {
        let idx = sample();
        let parks = idx.dataset("parks").unwrap();
        let names: Vec<&str> = idx
            .attributes_for_dataset(parks)
            .into_iter()
            .map(|attr| attr.name.as_str())
            .collect();
        assert_eq!(names, vec!["area_sqkm", "park_name"]);
    }

    #[test]
    fn reverse_lookup_lists_each_dataset_once() {
        let idx = sample();
        let ids: Vec<&str> = idx
            .datasets_for_attribute("area_sqkm")
            .into_iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(ids, vec!["parks", "trails"]);
    }

    #[test]
    fn dataset_search_is_case_insensitive() {
        let idx = sample();
        let hits: Vec<&str> = idx.filter_datasets("trails").into_iter().map(|d| d.id.as_str()).collect();
        assert_eq!(hits, vec!["trails"]);
        assert_eq!(idx.filter_datasets("RECREATION").len(), 1);
        assert_eq!(idx.filter_datasets("PATHS").len(), 1);
        assert_eq!(idx.filter_datasets("").len(), 2);
        assert!(idx.filter_datasets("volcano").is_empty());
    }

    #[test]
    fn attribute_search_covers_type_and_label() {
        let idx = sample();
        let hits: Vec<&str> = idx
            .filter_attributes("FLOAT")
            .into_iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(hits, vec!["area_sqkm"]);
        assert_eq!(idx.filter_attributes("park_").len(), 1);
        let custom = idx.filter_attributes_by(|haystack| haystack.starts_with("park"));
        assert_eq!(custom.len(), 1);
    }

    #[test]
    fn conflicts_and_summary() {
        let idx = sample();
        let reports = idx.conflicts();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].attribute.as_str(), "area_sqkm");
        assert_eq!(reports[0].conflicts.types, vec!["float", "string"]);

        let summary = idx.summary();
        assert_eq!(
            summary,
            CatalogSummary {
                datasets: 2,
                attributes: 2,
                conflicted_attributes: 1,
                skipped_records: 1,
                dangling_references: 1,
            }
        );
    }
}
