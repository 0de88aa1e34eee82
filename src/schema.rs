//! JSON Schema check for the catalog document container.
//!
//! The schema ships inside the crate (`schema/catalog_document.schema.json`)
//! and only constrains the top-level shape. Record contents are left to the
//! normalizer, which skips what it cannot use instead of rejecting the file.

use crate::error::LoadError;
use anyhow::{Context, Result, anyhow};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::sync::OnceLock;

pub(crate) const DOCUMENT_SCHEMA: &str = include_str!("../schema/catalog_document.schema.json");

static COMPILED: OnceLock<Result<JSONSchema, String>> = OnceLock::new();

/// Parse and compile the embedded document schema.
pub(crate) fn compile_document_schema() -> Result<JSONSchema> {
    let raw: Value =
        serde_json::from_str(DOCUMENT_SCHEMA).context("parsing embedded catalog document schema")?;
    JSONSchema::compile(&raw)
        .map_err(|err| anyhow!("compiling embedded catalog document schema: {err}"))
}

/// The compiled schema, built on first use and shared afterwards.
fn document_schema() -> Result<&'static JSONSchema, LoadError> {
    COMPILED
        .get_or_init(|| compile_document_schema().map_err(|err| format!("{err:#}")))
        .as_ref()
        .map_err(|detail| LoadError::Schema {
            detail: detail.clone(),
        })
}

/// Validate `document` against the container schema.
///
/// A document outside the schema is `MalformedJson`, with every validator
/// message joined. A schema that cannot compile is `Schema`.
pub(crate) fn validate_document(document: &Value) -> Result<(), LoadError> {
    let schema = document_schema()?;
    if let Err(errors) = schema.validate(document) {
        let details = errors
            .map(|err| err.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        return Err(LoadError::MalformedJson {
            detail: format!("catalog document failed schema validation:\n{details}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedded_schema_compiles() {
        compile_document_schema().unwrap();
        let first = document_schema().unwrap();
        let second = document_schema().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn accepts_both_container_shapes() {
        validate_document(&json!([{"id": "parks"}])).unwrap();
        validate_document(&json!({"objects": [], "attributes": []})).unwrap();
        validate_document(&json!({"datasets": null})).unwrap();
        validate_document(&json!({})).unwrap();
    }

    #[test]
    fn rejects_scalars_and_wrong_member_types() {
        for document in [json!("catalog"), json!(42), json!({"objects": {"parks": {}}})] {
            match validate_document(&document) {
                Err(LoadError::MalformedJson { detail }) => {
                    assert!(detail.contains("schema validation"), "{detail}");
                }
                other => panic!("expected a schema validation failure, got {other:?}"),
            }
        }
    }
}
