//! Canonical catalog entities.
//!
//! `Dataset` and `AttributeDecl` are produced by the normalizer with every
//! default already applied, so the index builder and the query façade never
//! look at raw JSON again. `Attribute` is the merged, index-built profile of
//! one attribute across every dataset that declares it.

use crate::catalog::conflict::AttributeConflicts;
use crate::catalog::identity::{AttributeKey, DatasetId, Nullability};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// One cataloged data product.
///
/// Display metadata is opaque; only `id`, `title` and the collections carry
/// defaults. `attributes` holds the inline declarations the dataset made
/// about its fields and is empty for catalogs that keep attributes in a
/// separate top-level table.
pub struct Dataset {
    pub id: DatasetId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub attribute_ids: Vec<AttributeKey>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub agency_owner: Option<String>,
    #[serde(default)]
    pub office_owner: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub access_level: Option<String>,
    #[serde(default)]
    pub update_frequency: Option<String>,
    #[serde(default)]
    pub geometry_type: Option<String>,
    #[serde(default)]
    pub objname: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub public_web_service: Option<String>,
    #[serde(default)]
    pub internal_web_service: Option<String>,
    #[serde(default)]
    pub data_standard: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeDecl>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// What a single record says about an attribute.
///
/// Used both for inline declarations inside a dataset and for entries of a
/// top-level attribute table.
pub struct AttributeDecl {
    pub name: AttributeKey,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub data_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub domain: Vec<DomainValue>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
/// One allowed value of an enumerated attribute.
pub struct DomainValue {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl DomainValue {
    /// Composite `(value, label)` key used for deduplication.
    pub fn dedup_key(&self) -> (&str, &str) {
        (self.value.as_str(), self.label.as_deref().unwrap_or(""))
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
/// Back-reference from an attribute to a dataset that declares it.
pub struct DatasetRef {
    pub id: DatasetId,
    pub title: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
/// Unmerged record of what one dataset said about an attribute.
pub struct AttributeDefinition {
    pub dataset_id: DatasetId,
    pub dataset_title: String,
    #[serde(rename = "type")]
    pub data_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// Canonical attribute profile merged across the whole catalog.
pub struct Attribute {
    pub name: AttributeKey,
    pub label: String,
    #[serde(rename = "type")]
    pub data_type: Option<String>,
    pub description: Option<String>,
    pub nullable: Nullability,
    pub examples: Vec<String>,
    pub domain_values: Vec<DomainValue>,
    pub datasets: Vec<DatasetRef>,
    pub definitions: Vec<AttributeDefinition>,
}

impl Attribute {
    /// Type/description disagreements across `definitions`.
    ///
    /// Recomputed on every call; nothing is cached on the attribute.
    pub fn conflicts(&self) -> AttributeConflicts {
        AttributeConflicts::from_definitions(&self.definitions)
    }
}

impl Dataset {
    /// Back-reference entry used when this dataset declares an attribute.
    pub fn to_ref(&self) -> DatasetRef {
        DatasetRef {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }

    /// Inline declaration for `key`, if this dataset made one.
    pub fn declaration(&self, key: &AttributeKey) -> Option<&AttributeDecl> {
        self.attributes.iter().find(|decl| &decl.name == key)
    }
}
