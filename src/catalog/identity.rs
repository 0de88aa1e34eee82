use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Stable primary key of a dataset (the catalog calls them "objects").
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(pub String);

/// Catalog-wide key of an attribute; the attribute's `name` or `id`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeKey(pub String);

impl DatasetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AttributeKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tri-state nullability of a canonical attribute.
///
/// Serializes as `true`, `false` or `null`. Merging only moves towards
/// `NotNull`; see [`Nullability::merge`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Nullability {
    #[default]
    Unknown,
    Nullable,
    NotNull,
}

impl Nullability {
    /// Fold one dataset's assertion into the merged state.
    ///
    /// `Some(false)` tightens to `NotNull` permanently. `Some(true)` only
    /// resolves `Unknown`; it never loosens a tightened attribute.
    pub fn merge(self, asserted: Option<bool>) -> Self {
        match (self, asserted) {
            (_, Some(false)) => Nullability::NotNull,
            (Nullability::Unknown, Some(true)) => Nullability::Nullable,
            (current, _) => current,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Nullability::Unknown => None,
            Nullability::Nullable => Some(true),
            Nullability::NotNull => Some(false),
        }
    }
}

impl Serialize for Nullability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_bool() {
            Some(value) => serializer.serialize_bool(value),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Nullability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<bool>::deserialize(deserializer)?;
        Ok(Nullability::Unknown.merge(value))
    }
}

/// Which kind of catalog entry a change request targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntityKind {
    Dataset,
    Attribute,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Dataset => "dataset",
            EntityKind::Attribute => "attribute",
        }
    }
}

impl Serialize for EntityKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullability_only_tightens() {
        let state = Nullability::Unknown.merge(Some(true));
        assert_eq!(state, Nullability::Nullable);
        let state = state.merge(Some(false));
        assert_eq!(state, Nullability::NotNull);
        let state = state.merge(Some(true));
        assert_eq!(state, Nullability::NotNull);
        assert_eq!(state.merge(None), Nullability::NotNull);
    }

    #[test]
    fn nullability_order_does_not_matter() {
        let forward = Nullability::Unknown.merge(Some(true)).merge(Some(false));
        let backward = Nullability::Unknown.merge(Some(false)).merge(Some(true));
        assert_eq!(forward, backward);
        assert_eq!(forward.as_bool(), Some(false));
    }

    #[test]
    fn nullability_serializes_as_optional_bool() {
        assert_eq!(serde_json::to_string(&Nullability::Unknown).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Nullability::NotNull).unwrap(), "false");
        let parsed: Nullability = serde_json::from_str("true").unwrap();
        assert_eq!(parsed, Nullability::Nullable);
    }

    #[test]
    fn keys_serialize_transparently() {
        let key = AttributeKey("area_sqkm".to_string());
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"area_sqkm\"");
        let id: DatasetId = serde_json::from_str("\"parks\"").unwrap();
        assert_eq!(id.as_str(), "parks");
    }
}
