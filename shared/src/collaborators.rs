//! Interfaces of the engine services the runtime drives but does not
//! implement: asset loading, rendering, audio, terrain and menu input.
//! Headless implementations are provided for servers, tests and demos.

use std::collections::HashMap;

use glam::Vec3;
use log::trace;

use crate::world::{
    component::{component_store::Component, components::Transform},
    entity::entity_id::EntityId,
};

/// Opaque reference to a loaded model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct ModelHandle(pub u32);

/// Viewpoint used to draw a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub field_of_view: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 20.0),
            target: Vec3::ZERO,
            field_of_view: std::f32::consts::FRAC_PI_4,
        }
    }
}

impl Component for Camera {}

/// One model instance to draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderItem {
    pub entity: EntityId,
    pub model: ModelHandle,
    pub transform: Transform,
}

/// Input commands for menu navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MenuCommand {
    Up,
    Down,
    Increase,
    Decrease,
    Select,
    Back,
}

pub trait AssetLoader {
    fn load_model(&mut self, name: &str) -> ModelHandle;
}

pub trait Renderer {
    fn draw(&mut self, items: &[RenderItem], camera: &Camera);
}

pub trait Audio {
    fn play_sound(&mut self, name: &str);
}

pub trait Terrain {
    fn height_at(&self, x: f32, z: f32) -> f32;
}

/// Polled once per frame by the menu.
pub trait MenuInput {
    fn poll(&mut self) -> Vec<MenuCommand>;
}

// Headless

/// Hands out a stable handle per distinct model name.
#[derive(Default)]
pub struct HeadlessAssets {
    handles: HashMap<String, ModelHandle>,
}

impl AssetLoader for HeadlessAssets {
    fn load_model(&mut self, name: &str) -> ModelHandle {
        let next = ModelHandle(self.handles.len() as u32);
        *self.handles.entry(name.to_string()).or_insert(next)
    }
}

#[derive(Default)]
pub struct NullRenderer {
    frames: u64,
}

impl NullRenderer {
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for NullRenderer {
    fn draw(&mut self, items: &[RenderItem], _camera: &Camera) {
        self.frames += 1;
        trace!("drawing {} item(s)", items.len());
    }
}

#[derive(Default)]
pub struct SilentAudio;

impl Audio for SilentAudio {
    fn play_sound(&mut self, name: &str) {
        trace!("sound `{}`", name);
    }
}

/// Terrain with a constant height.
#[derive(Default)]
pub struct FlatTerrain {
    pub height: f32,
}

impl Terrain for FlatTerrain {
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        self.height
    }
}

/// Replays a scripted list of commands, one batch per poll.
#[derive(Default)]
pub struct ScriptedInput {
    batches: std::collections::VecDeque<Vec<MenuCommand>>,
}

impl ScriptedInput {
    pub fn new(batches: Vec<Vec<MenuCommand>>) -> Self {
        Self {
            batches: batches.into(),
        }
    }

    pub fn push(&mut self, batch: Vec<MenuCommand>) {
        self.batches.push_back(batch);
    }
}

impl MenuInput for ScriptedInput {
    fn poll(&mut self) -> Vec<MenuCommand> {
        self.batches.pop_front().unwrap_or_default()
    }
}
