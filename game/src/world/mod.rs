mod particle;
mod round_system;
mod world_config;

pub use particle::{spawn_burst, Particle, ParticleSystem, GRAVITY};
pub use round_system::{
    RoundSystem, ANIMAL_MODEL, END_SOUND, GOAL_MODEL, HIT_SOUND, PLAYER_MODEL, POWER_UP_MODEL,
    START_SOUND, TRIGGER_MODEL,
};
pub use world_config::WorldConfig;
