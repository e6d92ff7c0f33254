use glam::{Quat, Vec3};

use thengill_shared::{Component, EntityId, FrameTime, Model, Scene, System, Transform};

pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// Short-lived, purely local debris. Never replicated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub velocity: Vec3,
    /// Seconds left before the particle is removed
    pub life: f32,
}

impl Component for Particle {}

/// Spawns `count` particles flying up and out of `origin`.
pub fn spawn_burst(
    scene: &mut Scene,
    model: &Model,
    origin: Vec3,
    count: usize,
    life: f32,
) -> Vec<EntityId> {
    let mut spawned = Vec::with_capacity(count);
    for _ in 0..count {
        let velocity = 6.0 * Vec3::new(fastrand::f32() - 0.5, fastrand::f32(), fastrand::f32() - 0.5);
        let size = 0.05 + 0.1 * fastrand::f32();

        let entity = scene.add_entity();
        scene.add_component(&entity, Particle { velocity, life });
        scene.add_component(
            &entity,
            Transform {
                position: origin,
                rotation: Quat::IDENTITY,
                scale: Vec3::splat(size),
            },
        );
        scene.add_component(&entity, model.clone());
        spawned.push(entity);
    }
    spawned
}

/// Moves particles under gravity and removes them once their life runs out.
pub struct ParticleSystem;

impl System for ParticleSystem {
    fn name(&self) -> &str {
        "ParticleSystem"
    }

    fn update(&mut self, scene: &mut Scene, time: &FrameTime) {
        let dt = time.dt as f32;
        for (entity, particle) in scene.get_components::<Particle>() {
            let life = particle.life - dt;
            if life <= 0.0 {
                scene.remove_entity(&entity);
                continue;
            }
            let velocity = particle.velocity + GRAVITY * dt;
            if let Some(particle) = scene.get_component_mut::<Particle>(&entity) {
                particle.life = life;
                particle.velocity = velocity;
            }
            if let Some(transform) = scene.get_component_mut::<Transform>(&entity) {
                transform.position += velocity * dt;
            }
        }
    }
}
