//! Conflict detection over per-dataset attribute definitions.
//!
//! A conflict is a presentational fact, never an error: it exists when the
//! distinct non-empty `type` (or `description`) values recorded for one
//! attribute number more than one.

use crate::catalog::model::AttributeDefinition;
use serde::Serialize;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
/// Distinct non-empty values seen per field, in first-seen order.
pub struct AttributeConflicts {
    pub types: Vec<String>,
    pub descriptions: Vec<String>,
}

impl AttributeConflicts {
    pub fn from_definitions(definitions: &[AttributeDefinition]) -> Self {
        Self {
            types: distinct_non_empty(definitions.iter().map(|def| def.data_type.as_deref())),
            descriptions: distinct_non_empty(
                definitions.iter().map(|def| def.description.as_deref()),
            ),
        }
    }

    pub fn has_type_conflict(&self) -> bool {
        self.types.len() > 1
    }

    pub fn has_description_conflict(&self) -> bool {
        self.descriptions.len() > 1
    }

    pub fn any(&self) -> bool {
        self.has_type_conflict() || self.has_description_conflict()
    }
}

fn distinct_non_empty<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values.flatten() {
        let value = value.trim();
        if value.is_empty() || seen.iter().any(|existing| existing == value) {
            continue;
        }
        seen.push(value.to_string());
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DatasetId;

    fn definition(dataset: &str, data_type: Option<&str>, description: Option<&str>) -> AttributeDefinition {
        AttributeDefinition {
            dataset_id: DatasetId(dataset.to_string()),
            dataset_title: dataset.to_string(),
            data_type: data_type.map(str::to_string),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn flags_distinct_types() {
        let conflicts = AttributeConflicts::from_definitions(&[
            definition("parks", Some("float"), Some("Area")),
            definition("trails", Some("string"), Some("Area")),
        ]);
        assert!(conflicts.has_type_conflict());
        assert!(!conflicts.has_description_conflict());
        assert_eq!(conflicts.types, vec!["float", "string"]);
    }

    #[test]
    fn empty_values_do_not_count() {
        let conflicts = AttributeConflicts::from_definitions(&[
            definition("parks", Some("float"), None),
            definition("trails", Some(""), Some("  ")),
            definition("roads", None, Some("Area in km")),
        ]);
        assert!(!conflicts.any());
        assert_eq!(conflicts.types, vec!["float"]);
        assert_eq!(conflicts.descriptions, vec!["Area in km"]);
    }

    #[test]
    fn repeated_values_are_not_conflicts() {
        let conflicts = AttributeConflicts::from_definitions(&[
            definition("a", Some("integer"), Some("Count")),
            definition("b", Some("integer"), Some("Count")),
        ]);
        assert!(!conflicts.any());
    }
}
