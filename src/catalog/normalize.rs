//! Raw JSON records to canonical entities.
//!
//! Defaults are applied here and nowhere else: titles fall back to ids and
//! then to `UNTITLED_DATASET`, records without an id get a positional one,
//! and absent collections become empty vectors.
//! Anything unusable is skipped with a `SkippedRecord` rather than failing
//! the catalog.

use crate::catalog::diagnostics::{Diagnostics, SkippedRecord};
use crate::catalog::identity::{AttributeKey, DatasetId};
use crate::catalog::model::{AttributeDecl, Dataset, DomainValue};
use crate::catalog::raw::RawCatalog;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Title given to a dataset record with neither `title` nor `id`.
pub const UNTITLED_DATASET: &str = "Untitled dataset";

/// Id given to a dataset record without one, keyed by its position.
pub fn positional_dataset_id(position: usize) -> DatasetId {
    DatasetId(format!("untitled-{position}"))
}

/// Output of the normalizer: canonical records plus what was dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedCatalog {
    pub datasets: Vec<Dataset>,
    /// Entries of the top-level attribute table, when the document has one.
    pub attributes: Vec<AttributeDecl>,
    pub diagnostics: Diagnostics,
}

/// Normalize every record of a raw catalog.
///
/// Dataset ids are unique in the result: the first record with a given id
/// is kept and later ones are reported as `DuplicateDataset`.
pub fn normalize_catalog(raw: RawCatalog) -> NormalizedCatalog {
    let mut diagnostics = Diagnostics::default();
    let mut seen_ids: BTreeSet<DatasetId> = BTreeSet::new();
    let mut datasets = Vec::with_capacity(raw.objects.len());

    for (position, record) in raw.objects.iter().enumerate() {
        let Some(map) = record.as_object() else {
            diagnostics.push(SkippedRecord::NonObjectRecord {
                table: "objects",
                position,
            });
            continue;
        };
        let dataset = normalize_dataset(map, position, &mut diagnostics);
        if !seen_ids.insert(dataset.id.clone()) {
            diagnostics.push(SkippedRecord::DuplicateDataset {
                id: dataset.id,
                position,
            });
            continue;
        }
        datasets.push(dataset);
    }

    let mut attributes = Vec::with_capacity(raw.attributes.len());
    for (position, record) in raw.attributes.iter().enumerate() {
        let Some(map) = record.as_object() else {
            diagnostics.push(SkippedRecord::NonObjectRecord {
                table: "attributes",
                position,
            });
            continue;
        };
        if let Some(decl) = normalize_attribute(map, None, position, &mut diagnostics) {
            attributes.push(decl);
        }
    }

    NormalizedCatalog {
        datasets,
        attributes,
        diagnostics,
    }
}

/// Build a canonical `Dataset` from one raw record.
///
/// A record without an id is still indexed under `positional_dataset_id`.
/// Inline attribute names are appended to `attribute_ids` after any
/// explicitly listed ids, without repeats.
pub fn normalize_dataset(
    record: &Map<String, Value>,
    position: usize,
    diagnostics: &mut Diagnostics,
) -> Dataset {
    let given_id = text_field(record, &["id"]);
    let title = text_field(record, &["title"])
        .or_else(|| given_id.clone())
        .unwrap_or_else(|| UNTITLED_DATASET.to_string());
    let id = given_id.map_or_else(|| positional_dataset_id(position), DatasetId);

    let mut attributes: Vec<AttributeDecl> = Vec::new();
    if let Some(Value::Array(entries)) = record.get("attributes") {
        for (index, entry) in entries.iter().enumerate() {
            let Some(map) = entry.as_object() else {
                diagnostics.push(SkippedRecord::UnnamedAttribute {
                    dataset: Some(id.clone()),
                    position: index,
                });
                continue;
            };
            let Some(decl) = normalize_attribute(map, Some(&id), index, diagnostics) else {
                continue;
            };
            if attributes.iter().any(|existing| existing.name == decl.name) {
                diagnostics.push(SkippedRecord::DuplicateDeclaration {
                    dataset: id.clone(),
                    attribute: decl.name,
                });
                continue;
            }
            attributes.push(decl);
        }
    }

    let mut attribute_ids: Vec<AttributeKey> = Vec::new();
    let listed = string_list(record, "attribute_ids").into_iter().map(AttributeKey);
    let inline = attributes.iter().map(|decl| decl.name.clone());
    for key in listed.chain(inline) {
        if !attribute_ids.contains(&key) {
            attribute_ids.push(key);
        }
    }

    let agency_owner = text_field(record, &["agency_owner"]);
    Dataset {
        title,
        description: text_field(record, &["description"]),
        topics: string_list(record, "topics"),
        keywords: string_list(record, "keywords"),
        attribute_ids,
        owner: text_field(record, &["owner"]).or_else(|| agency_owner.clone()),
        agency_owner,
        office_owner: text_field(record, &["office_owner"]),
        contact_email: text_field(record, &["contact_email"]),
        status: text_field(record, &["status"]),
        access_level: text_field(record, &["access_level"]),
        update_frequency: text_field(record, &["update_frequency"]),
        geometry_type: text_field(record, &["geometry_type"]),
        objname: text_field(record, &["objname"]),
        notes: text_field(record, &["notes"]),
        public_web_service: text_field(record, &["public_web_service"]),
        internal_web_service: text_field(record, &["internal_web_service"]),
        data_standard: text_field(record, &["data_standard"]),
        attributes,
        id,
    }
}

/// Build an `AttributeDecl` from an inline declaration or attribute table entry.
///
/// The key is `name`, falling back to `id`; records with neither are
/// skipped as `UnnamedAttribute`. Domain entries of an unknown shape are
/// dropped individually.
pub fn normalize_attribute(
    record: &Map<String, Value>,
    dataset: Option<&DatasetId>,
    position: usize,
    diagnostics: &mut Diagnostics,
) -> Option<AttributeDecl> {
    let Some(name) = text_field(record, &["name", "id"]).map(AttributeKey) else {
        diagnostics.push(SkippedRecord::UnnamedAttribute {
            dataset: dataset.cloned(),
            position,
        });
        return None;
    };

    let mut examples: Vec<String> = Vec::new();
    if let Some(example) = record.get("example").and_then(example_text) {
        examples.push(example);
    }
    if let Some(Value::Array(values)) = record.get("examples") {
        examples.extend(values.iter().filter_map(example_text));
    }

    let mut domain = Vec::new();
    let entries = ["domain", "values"]
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_array));
    for (index, entry) in entries.into_iter().flatten().enumerate() {
        match normalize_domain_entry(entry) {
            Some(value) => domain.push(value),
            None => diagnostics.push(SkippedRecord::UnrecognizedDomainEntry {
                attribute: name.clone(),
                position: index,
            }),
        }
    }

    Some(AttributeDecl {
        label: text_field(record, &["label"]),
        data_type: text_field(record, &["type", "data_type"]),
        description: text_field(record, &["description", "definition"]),
        nullable: record.get("nullable").and_then(Value::as_bool),
        examples,
        domain,
        name,
    })
}

/// Normalize one domain entry into a `(value, label, description)` triple.
///
/// Bare strings and numbers become a value with no label. Objects must carry
/// `value` or `code`. Every other shape yields `None`.
pub fn normalize_domain_entry(entry: &Value) -> Option<DomainValue> {
    match entry {
        Value::String(_) | Value::Number(_) => Some(DomainValue {
            value: scalar_text(entry)?,
            label: None,
            description: None,
        }),
        Value::Object(map) => {
            let value = ["value", "code"]
                .iter()
                .find_map(|key| map.get(*key).and_then(scalar_text))?;
            Some(DomainValue {
                value,
                label: text_field(map, &["label"]),
                description: text_field(map, &["description"]),
            })
        }
        _ => None,
    }
}

/// First non-empty scalar among `keys`, trimmed.
fn text_field(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        record
            .get(*key)
            .and_then(scalar_text)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Example values are coerced to strings; structured examples keep their JSON text.
fn example_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
        scalar => scalar_text(scalar),
    }
}

/// Read a list field that may be a JSON array or a comma-separated string.
fn string_list(record: &Map<String, Value>, key: &str) -> Vec<String> {
    match record.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_text)
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        Some(Value::String(text)) => split_list(text),
        _ => Vec::new(),
    }
}

/// Split a comma-delimited list into trimmed, non-empty tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("fixture must be an object, got {other}"),
        }
    }

    #[test]
    fn dataset_defaults_are_applied() {
        let mut diagnostics = Diagnostics::default();
        let dataset = normalize_dataset(&object(json!({"id": "parks"})), 0, &mut diagnostics);
        assert_eq!(dataset.title, "parks");
        assert!(dataset.topics.is_empty());
        assert!(dataset.keywords.is_empty());
        assert!(dataset.attribute_ids.is_empty());
        assert!(dataset.description.is_none());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn dataset_without_id_gets_a_positional_one() {
        let mut diagnostics = Diagnostics::default();
        let titled = normalize_dataset(&object(json!({"title": "Orphan"})), 3, &mut diagnostics);
        assert_eq!(titled.id.as_str(), "untitled-3");
        assert_eq!(titled.title, "Orphan");

        let bare = normalize_dataset(
            &object(json!({"attributes": [{"name": "orphan_attr"}]})),
            4,
            &mut diagnostics,
        );
        assert_eq!(bare.id, positional_dataset_id(4));
        assert_eq!(bare.title, UNTITLED_DATASET);
        assert_eq!(bare.attribute_ids, vec![AttributeKey("orphan_attr".to_string())]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn attribute_ids_merge_listed_and_inline_names() {
        let mut diagnostics = Diagnostics::default();
        let dataset = normalize_dataset(
            &object(json!({
                "id": "trails",
                "attribute_ids": ["surface", "length_km", "surface"],
                "attributes": [{"name": "length_km"}, {"id": "difficulty"}]
            })),
            0,
            &mut diagnostics,
        );
        let ids: Vec<&str> = dataset.attribute_ids.iter().map(AttributeKey::as_str).collect();
        assert_eq!(ids, vec!["surface", "length_km", "difficulty"]);
        assert_eq!(dataset.attributes.len(), 2);
    }

    #[test]
    fn comma_separated_lists_are_split() {
        let mut diagnostics = Diagnostics::default();
        let dataset = normalize_dataset(
            &object(json!({"id": "a", "topics": "Parks, Recreation ,", "keywords": ["x", " ", 7]})),
            0,
            &mut diagnostics,
        );
        assert_eq!(dataset.topics, vec!["Parks", "Recreation"]);
        assert_eq!(dataset.keywords, vec!["x", "7"]);
    }

    #[test]
    fn unnamed_and_repeated_declarations_are_reported() {
        let mut diagnostics = Diagnostics::default();
        let dataset = normalize_dataset(
            &object(json!({
                "id": "roads",
                "attributes": [{"type": "string"}, {"name": "lanes"}, {"name": "lanes"}, "bogus"]
            })),
            0,
            &mut diagnostics,
        );
        assert_eq!(dataset.attributes.len(), 1);
        let id = DatasetId("roads".to_string());
        assert_eq!(
            diagnostics.records(),
            &[
                SkippedRecord::UnnamedAttribute {
                    dataset: Some(id.clone()),
                    position: 0
                },
                SkippedRecord::DuplicateDeclaration {
                    dataset: id.clone(),
                    attribute: AttributeKey("lanes".to_string())
                },
                SkippedRecord::UnnamedAttribute {
                    dataset: Some(id),
                    position: 3
                },
            ]
        );
    }

    #[test]
    fn attribute_fields_and_aliases() {
        let mut diagnostics = Diagnostics::default();
        let decl = normalize_attribute(
            &object(json!({
                "id": "status",
                "data_type": "string",
                "definition": "Lifecycle state",
                "nullable": false,
                "example": 3,
                "examples": ["open", null, {"nested": true}]
            })),
            None,
            0,
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(decl.name.as_str(), "status");
        assert!(decl.label.is_none());
        assert_eq!(decl.data_type.as_deref(), Some("string"));
        assert_eq!(decl.description.as_deref(), Some("Lifecycle state"));
        assert_eq!(decl.nullable, Some(false));
        assert_eq!(decl.examples, vec!["3", "open", r#"{"nested":true}"#]);
    }

    #[test]
    fn domain_entries_accept_scalars_and_objects() {
        assert_eq!(
            normalize_domain_entry(&json!("A")),
            Some(DomainValue {
                value: "A".to_string(),
                label: None,
                description: None
            })
        );
        assert_eq!(normalize_domain_entry(&json!(2)).map(|d| d.value), Some("2".to_string()));
        let coded = normalize_domain_entry(&json!({"code": 1, "label": "Yes", "description": "Affirmative"}))
            .unwrap();
        assert_eq!(coded.value, "1");
        assert_eq!(coded.label.as_deref(), Some("Yes"));
        assert_eq!(coded.description.as_deref(), Some("Affirmative"));
    }

    #[test]
    fn unrecognized_domain_entries_are_skipped_silently() {
        assert!(normalize_domain_entry(&json!(true)).is_none());
        assert!(normalize_domain_entry(&json!(null)).is_none());
        assert!(normalize_domain_entry(&json!(["1"])).is_none());
        assert!(normalize_domain_entry(&json!({"label": "No value"})).is_none());

        let mut diagnostics = Diagnostics::default();
        let decl = normalize_attribute(
            &object(json!({"name": "flag", "values": ["Y", false, {"value": "N"}]})),
            None,
            0,
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(decl.domain.len(), 2);
        assert_eq!(
            diagnostics.records(),
            &[SkippedRecord::UnrecognizedDomainEntry {
                attribute: AttributeKey("flag".to_string()),
                position: 1
            }]
        );
    }

    #[test]
    fn duplicate_dataset_ids_keep_the_first() {
        let raw = RawCatalog {
            objects: vec![
                json!({"id": "parks", "title": "First"}),
                json!(17),
                json!({"id": "parks", "title": "Second"}),
            ],
            attributes: vec![json!({"label": "nameless"})],
        };
        let normalized = normalize_catalog(raw);
        assert_eq!(normalized.datasets.len(), 1);
        assert_eq!(normalized.datasets[0].title, "First");
        assert!(normalized.attributes.is_empty());
        assert_eq!(normalized.diagnostics.len(), 3);
        assert!(matches!(
            normalized.diagnostics.records()[1],
            SkippedRecord::DuplicateDataset { position: 2, .. }
        ));
    }
}
