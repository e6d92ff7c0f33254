//! Factories for every scene of the game. Networked games get a
//! NetworkSystem in each scene, registered first so inbound traffic and
//! authority are in place before gameplay systems run.

use log::debug;

use thengill_shared::{Camera, Scene};

use crate::{
    lobby::{LobbySettings, LobbySystem},
    render_system::RenderSystem,
    services::GameServices,
    summary::{RoundSummary, SummarySystem},
    world::{Particle, ParticleSystem, RoundSystem, WorldConfig},
};

pub const LOBBY_SCENE: &str = "lobby";
pub const WORLD_SCENE: &str = "world";
pub const SUMMARY_SCENE: &str = "summary";

fn networked_scene(services: &GameServices, name: &str, replicate: bool) -> Scene {
    let mut scene = Scene::new(name);
    if let Some(network) = services.network_system() {
        debug!("Scene `{}` is networked", name);
        if replicate {
            scene.add_system(network);
        } else {
            scene.add_system(network.without_replication());
        }
    }
    scene
}

pub fn lobby_scene(services: &GameServices, settings: LobbySettings) -> Scene {
    let mut scene = networked_scene(services, LOBBY_SCENE, false);
    scene.add_system(LobbySystem::new(services.clone(), settings));
    scene
}

pub fn world_scene(services: &GameServices, config: WorldConfig) -> Scene {
    let mut scene = networked_scene(services, WORLD_SCENE, true);
    scene.register_component::<Camera>();
    scene.register_component::<Particle>();
    scene.add_system(RoundSystem::new(services.clone(), config));
    scene.add_system(ParticleSystem);
    scene.add_system(RenderSystem::new(services.renderer.clone()));
    scene
}

/// Local only: peers leave their rounds at different times.
pub fn summary_scene(services: &GameServices, summary: RoundSummary) -> Scene {
    let mut scene = Scene::new(SUMMARY_SCENE);
    scene.add_system(SummarySystem::new(summary, services.input.clone()));
    scene
}
