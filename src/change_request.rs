//! Change-request payloads derived from catalog entities.
//!
//! Entities are serialized to JSON, compacted (empty strings, empty arrays,
//! empty objects and nulls dropped), and compared key by key. Because
//! compaction runs first, clearing a field and never setting it look the
//! same in a diff; consumers only care about the resulting value.

use crate::catalog::{Attribute, DomainValue, EntityKind, Nullability};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
/// One differing top-level key. `None` means absent after compaction.
pub struct FieldChange {
    pub key: String,
    pub from: Option<Value>,
    pub to: Option<Value>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    NewEntry,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Data embedded in a change-request issue: the compacted snapshot of the
/// proposed entity and, for edits, the field changes against the original.
pub struct ChangeRequest {
    pub kind: RequestKind,
    pub entity: EntityKind,
    pub id: String,
    pub snapshot: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<FieldChange>,
}

impl ChangeRequest {
    /// Proposal for an entry that does not exist yet.
    pub fn new_entry<T: Serialize>(entity: EntityKind, id: &str, draft: &T) -> Result<Self> {
        let snapshot = compact(to_object(draft).context("serializing draft entry")?);
        Ok(Self {
            kind: RequestKind::NewEntry,
            entity,
            id: id.to_string(),
            snapshot,
            changes: Vec::new(),
        })
    }

    /// Proposal to change an existing entry.
    ///
    /// Fails when the draft is identical to the original after compaction;
    /// there is nothing to request.
    pub fn edit<T: Serialize>(
        entity: EntityKind,
        id: &str,
        original: &T,
        updated: &T,
    ) -> Result<Self> {
        let original = to_object(original).context("serializing original entry")?;
        let updated = to_object(updated).context("serializing updated entry")?;
        let changes = diff(&original, &updated);
        if changes.is_empty() {
            bail!("no changes between original and updated {} '{id}'", entity.as_str());
        }
        Ok(Self {
            kind: RequestKind::Edit,
            entity,
            id: id.to_string(),
            snapshot: compact(updated),
            changes,
        })
    }
}

/// Drop keys whose value is null, `""`, `[]` or `{}`.
///
/// Only top-level keys of an object are inspected; other values pass through.
pub fn compact(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, value)| !is_blank(value))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

/// Structural diff of two entities after compaction.
///
/// Considers the union of keys on both sides in sorted order and emits one
/// `FieldChange` per key whose values are not deeply equal.
pub fn diff(original: &Value, updated: &Value) -> Vec<FieldChange> {
    let original = compact(original.clone());
    let updated = compact(updated.clone());
    let empty = Map::new();
    let before = original.as_object().unwrap_or(&empty);
    let after = updated.as_object().unwrap_or(&empty);

    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    keys.into_iter()
        .filter_map(|key| {
            let from = before.get(key);
            let to = after.get(key);
            (from != to).then(|| FieldChange {
                key: key.clone(),
                from: from.cloned(),
                to: to.cloned(),
            })
        })
        .collect()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn to_object<T: Serialize>(entity: &T) -> Result<Value> {
    let value = serde_json::to_value(entity)?;
    if !value.is_object() {
        bail!("change requests require an object-shaped entity");
    }
    Ok(value)
}

/// Editable projection of a canonical attribute.
///
/// Aggregates such as back-references and definitions are derived by the
/// index and are not part of an edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeDraft {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub data_type: Option<String>,
    pub description: Option<String>,
    pub nullable: Nullability,
    pub examples: Vec<String>,
    pub domain_values: Vec<DomainValue>,
}

impl From<&Attribute> for AttributeDraft {
    fn from(attribute: &Attribute) -> Self {
        Self {
            name: attribute.name.0.clone(),
            label: attribute.label.clone(),
            data_type: attribute.data_type.clone(),
            description: attribute.description.clone(),
            nullable: attribute.nullable,
            examples: attribute.examples.clone(),
            domain_values: attribute.domain_values.clone(),
        }
    }
}
