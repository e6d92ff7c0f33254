use std::fmt;

use serde::{Deserialize, Serialize};

// EntityId
/// Opaque, per-peer identifier of a game object. Two peers may assign
/// different ids to the same replicated object; use `SyncId` to talk about an
/// object across the network.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    pub fn from_u32(value: u32) -> Self {
        Self(value)
    }

    pub fn to_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
