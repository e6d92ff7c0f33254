//! # Thengill Shared
//! Entity/component/system runtime, event bus and peer wire types shared by
//! every Thengill crate.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod collaborators;
pub mod events;
mod messages;
mod scene;
mod world;

pub use collaborators::{
    AssetLoader, Audio, Camera, FlatTerrain, HeadlessAssets, MenuCommand, MenuInput, ModelHandle,
    NullRenderer, RenderItem, Renderer, ScriptedInput, SilentAudio, Terrain,
};
pub use events::{
    error::HandlerError,
    event_bus::{EventBus, HandlerResult, SubscriptionId},
    event_data::EventData,
    names,
};
pub use messages::{
    codec::{decode, encode, frame, FrameDecoder, DEFAULT_MAX_FRAME_BYTES, FRAME_HEADER_BYTES},
    error::WireError,
    menu_item::MenuItem,
    peer_message::{GameEnd, Hello, PeerMessage, Roster},
    roster::{NetworkPeer, RosterEntry},
    sync_message::{SyncExtra, SyncId, SyncKind, SyncMessage},
};
pub use scene::{
    authority::Authority,
    director::SceneDirector,
    scene::{Outcome, Scene, SceneState, Transition},
    system::System,
    time::{FrameClock, FrameTime},
};
pub use world::{
    component::{
        component_kinds::ComponentKind,
        component_store::{Component, ComponentStore},
        components::{
            register_builtin, Body, Health, Label, LocalInput, Model, Player, Score, SyncObject,
            Transform,
        },
        error::ComponentError,
    },
    entity::{entity_id::EntityId, entity_registry::EntityRegistry},
};
