use std::{cell::RefCell, rc::Rc};

use thengill_game::{lobby::LobbySettings, scenes, GameServices};
use thengill_peer::{LocalHub, NetworkSession, SessionConfig, SharedSession, SyncConfig};
use thengill_shared::{MenuCommand, Scene, SceneDirector, ScriptedInput};

use super::recording::{RecordingAudio, RecordingRenderer};

/// Long enough to clear the menu input cooldown in one frame.
pub const FRAME_SECONDS: f64 = 0.25;

/// Opens a session on `hub` that dials `seeds`.
pub fn test_session(hub: &LocalHub, address: &str, joined_at: u64, seeds: &[&str]) -> SharedSession {
    let mut config = SessionConfig::new(address).joined_at(joined_at);
    for seed in seeds {
        config = config.peer(*seed);
    }
    Rc::new(RefCell::new(NetworkSession::new(
        &config,
        Box::new(hub.socket(address)),
    )))
}

/// Runs `frames` updates on every scene, one scene after the other.
pub fn run_frames(scenes: &mut [&mut Scene], frames: usize, dt: f64) {
    for _ in 0..frames {
        for scene in scenes.iter_mut() {
            let t = scene.time().t + dt;
            scene.update(t, dt);
        }
    }
}

/// Runs `frames` frames on every game, interleaved.
pub fn run_director_frames(games: &mut [&mut TestGame], frames: usize) {
    for _ in 0..frames {
        for game in games.iter_mut() {
            game.frame();
        }
    }
}

/// One game process: its session, collaborators and scene stack.
pub struct TestGame {
    pub session: Option<SharedSession>,
    pub services: GameServices,
    pub input: Rc<RefCell<ScriptedInput>>,
    pub audio: Rc<RefCell<RecordingAudio>>,
    pub renderer: Rc<RefCell<RecordingRenderer>>,
    pub director: SceneDirector,
}

impl TestGame {
    pub fn offline() -> Self {
        Self::build(None)
    }

    pub fn networked(hub: &LocalHub, address: &str, joined_at: u64, seeds: &[&str]) -> Self {
        Self::build(Some(test_session(hub, address, joined_at, seeds)))
    }

    fn build(session: Option<SharedSession>) -> Self {
        let input = Rc::new(RefCell::new(ScriptedInput::default()));
        let audio = Rc::new(RefCell::new(RecordingAudio::default()));
        let renderer = Rc::new(RefCell::new(RecordingRenderer::default()));

        let mut services = GameServices::headless();
        services.input = input.clone();
        services.audio = audio.clone();
        services.renderer = renderer.clone();
        if let Some(session) = &session {
            services = services.with_network(session.clone(), SyncConfig::default(), 64);
        }

        Self {
            session,
            services,
            input,
            audio,
            renderer,
            director: SceneDirector::new(),
        }
    }

    pub fn enter_lobby(&mut self) {
        let lobby = scenes::lobby_scene(&self.services, LobbySettings::default());
        self.director.enter(lobby);
    }

    pub fn scene(&self) -> &Scene {
        self.director.current().expect("a scene is running")
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        self.director.current_mut().expect("a scene is running")
    }

    pub fn scene_name(&self) -> Option<String> {
        self.director.current().map(|scene| scene.name().to_string())
    }

    /// Queues one batch of input, consumed by the next frame.
    pub fn press(&self, commands: Vec<MenuCommand>) {
        self.input.borrow_mut().push(commands);
    }

    pub fn frame(&mut self) {
        self.director.frame(FRAME_SECONDS);
    }
}
