use std::{cell::RefCell, rc::Rc};

use glam::Vec3;

use thengill_shared::{
    Camera, FrameTime, Model, RenderItem, Renderer, Scene, System, Transform,
};

/// Height of a following camera above its entity.
pub const CAMERA_HEIGHT: f32 = 3.5;
/// Distance of a following camera behind its entity.
pub const CAMERA_DISTANCE: f32 = 3.5;

/// Keeps cameras behind the entity that carries them, and hands every
/// model in the scene to the renderer once per camera.
pub struct RenderSystem {
    renderer: Rc<RefCell<dyn Renderer>>,
}

impl RenderSystem {
    pub fn new(renderer: Rc<RefCell<dyn Renderer>>) -> Self {
        Self { renderer }
    }
}

/// Everything that has both a Model and a Transform, in insertion order.
pub fn render_items(scene: &Scene) -> Vec<RenderItem> {
    scene
        .get_components::<Model>()
        .into_iter()
        .filter_map(|(entity, model)| {
            let transform = scene.get_component_from_entity::<Transform>(&entity)?;
            Some(RenderItem {
                entity,
                model: model.handle,
                transform: *transform,
            })
        })
        .collect()
}

impl System for RenderSystem {
    fn name(&self) -> &str {
        "RenderSystem"
    }

    fn update(&mut self, scene: &mut Scene, _time: &FrameTime) {
        for (entity, camera) in scene.get_components::<Camera>() {
            let Some(transform) = scene.get_component_from_entity::<Transform>(&entity) else {
                continue;
            };
            let target = transform.position;
            let position = target + Vec3::new(0.0, CAMERA_HEIGHT, CAMERA_DISTANCE);
            // only write on movement, writes mark the entity for replication
            if camera.target != target || camera.position != position {
                if let Some(camera) = scene.get_component_mut::<Camera>(&entity) {
                    camera.target = target;
                    camera.position = position;
                }
            }
        }
    }

    fn draw(&mut self, scene: &Scene, _time: &FrameTime) {
        let cameras = scene.get_components::<Camera>();
        if cameras.is_empty() {
            return;
        }
        let items = render_items(scene);
        let mut renderer = self.renderer.borrow_mut();
        for (_, camera) in cameras {
            renderer.draw(&items, &camera);
        }
    }
}
