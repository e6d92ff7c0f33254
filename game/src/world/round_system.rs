use std::{cell::Cell, f32::consts::FRAC_PI_2, rc::Rc};

use glam::{Quat, Vec3};
use log::{debug, info};

use thengill_shared::{
    names, Body, Camera, EntityId, EventData, FrameTime, HandlerError, Health, LocalInput, Model,
    Player, Scene, Score, SyncObject, System, Transform, Transition,
};

use crate::{scenes, services::GameServices, summary::RoundSummary};

use super::{particle, world_config::WorldConfig};

pub const START_SOUND: &str = "Sounds/Effects/horn_start";
pub const END_SOUND: &str = "Sounds/Effects/horny_end";
pub const HIT_SOUND: &str = "Sounds/Effects/Hit";

pub const PLAYER_MODEL: &str = "viking";
pub const GOAL_MODEL: &str = "tree";
pub const ANIMAL_MODEL: &str = "animal";
pub const TRIGGER_MODEL: &str = "trigger";
pub const POWER_UP_MODEL: &str = "powerup";
const BLOOD_MODEL: &str = "blood";

const PLAYER_RADIUS: f32 = 0.7;
const PLAYER_HEALTH: f32 = 3.0;
const HIT_PARTICLES: usize = 100;
const PARTICLE_LIFE: f32 = 1.7;

/// Rules of one round: spawns the local player, and on the authoritative
/// peer the world content and the goal. Ends the round when a player reaches
/// the goal or the timer runs out.
pub struct RoundSystem {
    services: GameServices,
    config: WorldConfig,
    player: Option<EntityId>,
    goal: Option<EntityId>,
    round_clock: Rc<Cell<f64>>,
    timer_expired: bool,
}

impl RoundSystem {
    pub fn new(services: GameServices, config: WorldConfig) -> Self {
        Self {
            services,
            config,
            player: None,
            goal: None,
            round_clock: Rc::new(Cell::new(0.0)),
            timer_expired: false,
        }
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    pub fn goal(&self) -> Option<EntityId> {
        self.goal
    }

    fn load_model(&self, file_name: &str) -> Model {
        Model {
            file_name: file_name.to_string(),
            handle: self.services.assets.borrow_mut().load_model(file_name),
        }
    }

    fn spawn_player(&self, scene: &mut Scene) -> EntityId {
        let spawn = self.config.player_spawn;
        let height = self.services.terrain.height_at(spawn.x, spawn.y);

        let player = scene.add_entity();
        scene.add_component(
            &player,
            Body {
                velocity: Vec3::ZERO,
                radius: PLAYER_RADIUS,
            },
        );
        scene.add_component(&player, LocalInput);
        scene.add_component(&player, Player);
        scene.add_component(
            &player,
            Transform {
                position: Vec3::new(spawn.x, height, spawn.y),
                rotation: Quat::from_rotation_y(FRAC_PI_2),
                scale: Vec3::splat(0.5),
            },
        );
        scene.add_component(&player, self.load_model(PLAYER_MODEL));
        scene.add_component(&player, SyncObject::new(PLAYER_MODEL));
        scene.add_component(&player, Health::full(PLAYER_HEALTH));
        scene.add_component(&player, Score::default());
        scene.add_component(&player, Camera::default());
        player
    }

    fn spawn_world_content(&self, scene: &mut Scene) {
        let extent = self.config.map_scale / 2.0;
        self.scatter(scene, ANIMAL_MODEL, self.config.flocks, extent);
        self.scatter(scene, TRIGGER_MODEL, self.config.triggers, extent);
        self.scatter(scene, POWER_UP_MODEL, self.config.power_ups, extent);
    }

    /// Places `count` synced objects at random spots on the terrain.
    fn scatter(&self, scene: &mut Scene, file_name: &str, count: u32, extent: f32) {
        let model = self.load_model(file_name);
        for _ in 0..count {
            let x = extent * (2.0 * fastrand::f32() - 1.0);
            let z = extent * (2.0 * fastrand::f32() - 1.0);
            let y = self.services.terrain.height_at(x, z);

            let entity = scene.add_entity();
            scene.add_component(&entity, Transform::from_position(Vec3::new(x, y, z)));
            scene.add_component(&entity, model.clone());
            scene.add_component(&entity, SyncObject::new(file_name));
            scene.add_component(
                &entity,
                Body {
                    velocity: Vec3::ZERO,
                    radius: 1.0,
                },
            );
        }
        debug!("Spawned {} `{}` object(s)", count, file_name);
    }

    fn spawn_goal(&self, scene: &mut Scene) -> EntityId {
        let goal = scene.add_entity();
        scene.add_component(
            &goal,
            Body {
                velocity: Vec3::ZERO,
                radius: self.config.goal_radius,
            },
        );
        scene.add_component(&goal, Transform::from_position(self.config.goal_position));
        scene.add_component(&goal, SyncObject::new(GOAL_MODEL));
        scene.add_component(&goal, self.load_model(GOAL_MODEL));
        goal
    }
}

impl System for RoundSystem {
    fn name(&self) -> &str {
        "RoundSystem"
    }

    fn init(&mut self, scene: &mut Scene) {
        let player = self.spawn_player(scene);
        self.player = Some(player);

        let audio = self.services.audio.clone();
        let blood = self.load_model(BLOOD_MODEL);
        scene.on_event(names::HIT, move |scene, data| {
            let entity = data.entity(names::HIT)?;
            let Some(transform) = scene.get_component_from_entity::<Transform>(&entity).copied()
            else {
                return Err(HandlerError::EntityNotAlive {
                    event: names::HIT.to_string(),
                    entity: entity.to_string(),
                });
            };
            particle::spawn_burst(scene, &blood, transform.position, HIT_PARTICLES, PARTICLE_LIFE);
            audio.borrow_mut().play_sound(HIT_SOUND);
            Ok(())
        });

        let services = self.services.clone();
        let round_clock = self.round_clock.clone();
        scene.on_event(names::GAME_END, move |scene, data| {
            let winner = data.entity(names::GAME_END)?;
            if !scene.end_game(winner) {
                return Ok(());
            }
            services.audio.borrow_mut().play_sound(END_SOUND);
            let summary = RoundSummary {
                elapsed: round_clock.get(),
                score: scene
                    .get_component_from_entity::<Score>(&player)
                    .map_or(0, |score| score.score),
                won: scene.outcome().is_some_and(|outcome| outcome.local_win),
            };
            let next = scenes::summary_scene(&services, summary);
            scene.request_transition(Transition::Replace(Box::new(next)));
            Ok(())
        });

        if scene.is_authoritative() {
            self.spawn_world_content(scene);
            let goal = self.spawn_goal(scene);
            self.goal = Some(goal);

            scene.on_event(names::COLLISION, move |scene, data| {
                let (first, second) = data.collision(names::COLLISION)?;
                let other = if first == goal {
                    second
                } else if second == goal {
                    first
                } else {
                    return Ok(());
                };
                if scene.entity_has_component::<Player>(&other) {
                    scene.raise(names::NETWORK_GAME_END, EventData::Entity(other));
                    scene.raise(names::GAME_END, EventData::Entity(other));
                }
                Ok(())
            });
        }

        self.services.audio.borrow_mut().play_sound(START_SOUND);
        info!(
            "Round on `{}` started, {} s on the clock",
            self.config.map, self.config.round_time
        );
    }

    fn update(&mut self, scene: &mut Scene, time: &FrameTime) {
        if scene.is_ended() {
            return;
        }
        let elapsed = self.round_clock.get() + time.dt;
        self.round_clock.set(elapsed);

        if !self.timer_expired && elapsed > self.config.round_time {
            self.timer_expired = true;
            info!("Round timer expired after {:.1} s", elapsed);
            if let Some(player) = self.player {
                scene.raise(names::GAME_END, EventData::Entity(player));
            }
        }
    }
}
