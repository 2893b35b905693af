//! Creature records and the payloads that create or patch them

use serde::{Deserialize, Serialize};

/// A persisted catalog record
///
/// Serialized with camelCase keys, so the cached collection and the HTTP
/// responses share the same `{id, name, types, imageUrl}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creature {
    /// Assigned by the record store, never reused
    pub id: i64,
    pub name: String,
    /// Display order matters; duplicates are allowed
    pub types: Vec<String>,
    pub image_url: String,
}

/// A creature that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCreature {
    pub name: String,
    pub types: Vec<String>,
    pub image_url: String,
}

impl NewCreature {
    pub fn new(
        name: impl Into<String>,
        types: impl IntoIterator<Item = impl Into<String>>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            types: types.into_iter().map(Into::into).collect(),
            image_url: image_url.into(),
        }
    }

    /// Attach the store-assigned id
    pub fn with_id(self, id: i64) -> Creature {
        Creature {
            id,
            name: self.name,
            types: self.types,
            image_url: self.image_url,
        }
    }
}

/// Partial update: only the fields that are `Some` replace stored values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreaturePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CreaturePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.types.is_none() && self.image_url.is_none()
    }

    /// Apply present fields to `creature`, leaving the rest untouched
    pub fn apply_to(self, creature: &mut Creature) {
        if let Some(name) = self.name {
            creature.name = name;
        }
        if let Some(types) = self.types {
            creature.types = types;
        }
        if let Some(image_url) = self.image_url {
            creature.image_url = image_url;
        }
    }
}

/// Acknowledgement returned by a successful delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub id: i64,
    pub message: String,
}

impl Deleted {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            message: format!("Pokemon {} successfully deleted", id),
        }
    }
}
