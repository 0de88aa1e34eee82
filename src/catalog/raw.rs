//! Boundary parse of the catalog document.
//!
//! The document arrives either as a bare array of dataset records or as an
//! object with `objects` (legacy `datasets`) and `attributes` arrays. The
//! shape is decided once here and flattened into `RawCatalog`; nothing past
//! this module knows which form the file used.

use crate::error::LoadError;
use crate::schema::validate_document;
use serde_json::{Map, Value};

/// The two accepted container shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDocument {
    /// Dataset records, each carrying its own `attributes` array.
    Bare(Vec<Value>),
    /// Separate dataset and attribute tables cross-referenced by `attribute_ids`.
    Split {
        objects: Vec<Value>,
        attributes: Vec<Value>,
    },
}

/// Shape-independent view of the document's records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCatalog {
    pub objects: Vec<Value>,
    pub attributes: Vec<Value>,
}

impl RawDocument {
    /// Classify an already parsed and validated JSON value.
    pub fn from_value(value: Value) -> Result<Self, LoadError> {
        match value {
            Value::Array(items) => Ok(RawDocument::Bare(items)),
            Value::Object(mut map) => {
                // `objects` is the current key; `datasets` is only read when it is absent.
                let objects = take_array(&mut map, "objects")
                    .or_else(|| take_array(&mut map, "datasets"))
                    .unwrap_or_default();
                let attributes = take_array(&mut map, "attributes").unwrap_or_default();
                Ok(RawDocument::Split {
                    objects,
                    attributes,
                })
            }
            other => Err(LoadError::MalformedJson {
                detail: format!("expected an array or object, found {}", json_kind(&other)),
            }),
        }
    }
}

impl From<RawDocument> for RawCatalog {
    fn from(document: RawDocument) -> Self {
        match document {
            RawDocument::Bare(objects) => RawCatalog {
                objects,
                attributes: Vec::new(),
            },
            RawDocument::Split {
                objects,
                attributes,
            } => RawCatalog {
                objects,
                attributes,
            },
        }
    }
}

/// Parse a response body into a `RawCatalog`.
///
/// Invalid JSON and container shapes outside the schema both fail with
/// `LoadError::MalformedJson`; a schema that cannot compile fails with
/// `LoadError::Schema`. Missing tables are valid and become empty.
pub fn parse_document(body: &[u8]) -> Result<RawCatalog, LoadError> {
    let value: Value = serde_json::from_slice(body).map_err(|err| LoadError::MalformedJson {
        detail: err.to_string(),
    })?;
    validate_document(&value)?;
    Ok(RawDocument::from_value(value)?.into())
}

fn take_array(map: &mut Map<String, Value>, key: &str) -> Option<Vec<Value>> {
    match map.remove(key) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
