use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{collaborators::ModelHandle, messages::sync_message::SyncId};

use super::component_store::{Component, ComponentStore};

/// Position, orientation and scale of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Component for Transform {}

/// Marks an entity as replicated between peers.
///
/// `sync_id` is the network-stable identity of the entity. It is `None` until
/// the owning peer first broadcasts the entity, at which point one is assigned.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SyncObject {
    pub sync_id: Option<SyncId>,
    pub file_name: String,
}

impl SyncObject {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            sync_id: None,
            file_name: file_name.into(),
        }
    }

    pub fn with_id(sync_id: impl Into<SyncId>, file_name: impl Into<String>) -> Self {
        Self {
            sync_id: Some(sync_id.into()),
            file_name: file_name.into(),
        }
    }
}

impl Component for SyncObject {}

/// Reference to a model resolved by the asset loader.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub file_name: String,
    pub handle: ModelHandle,
}

impl Component for Model {}

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub velocity: Vec3,
    pub radius: f32,
}

impl Component for Body {}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub health: f32,
    pub max_health: f32,
}

impl Health {
    pub fn full(max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
        }
    }
}

impl Component for Health {}

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Score {
    pub score: i32,
}

impl Component for Score {}

/// Tag: the entity is a player avatar.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Player;

impl Component for Player {}

/// Tag: the entity is driven by this peer's input devices.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LocalInput;

impl Component for LocalInput {}

/// A line of UI text.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Label {
    pub text: String,
    pub highlighted: bool,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: false,
        }
    }
}

impl Component for Label {}

/// Registers the built-in component set on `store`.
pub fn register_builtin(store: &mut ComponentStore) {
    store.register::<Transform>();
    store.register::<SyncObject>();
    store.register::<Model>();
    store.register::<Body>();
    store.register::<Health>();
    store.register::<Score>();
    store.register::<Player>();
    store.register::<LocalInput>();
    store.register::<Label>();
}
