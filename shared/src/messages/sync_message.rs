use std::fmt;

use serde::{Deserialize, Serialize};

use crate::world::component::components::{Body, Health, Score, Transform};

/// Network-stable identity of a replicated entity. The same logical object has
/// the same `SyncId` on every peer, whatever its local `EntityId`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncId(String);

impl SyncId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SyncId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SyncId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SyncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncKind {
    Create,
    Update,
}

/// Archetype specific state carried next to the transform.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncExtra {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub player: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Whole-state snapshot of one replicated entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMessage {
    pub sync_id: SyncId,
    pub kind: SyncKind,
    pub file_name: String,
    pub transform: Transform,
    #[serde(default)]
    pub extra: SyncExtra,
    /// Per `sync_id` counter of the sender. Receivers drop anything older
    /// than what they already applied.
    #[serde(default)]
    pub revision: u64,
}
