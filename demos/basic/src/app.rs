use std::{
    cell::RefCell,
    rc::Rc,
    thread,
    time::{Duration, Instant},
};

use log::info;

use thengill_game::{scenes, GameServices};
use thengill_peer::{NetworkSession, SyncConfig, TcpSocket, TransportError};
use thengill_shared::SceneDirector;

use crate::{config::DemoConfig, stdin_input::StdinInput};

pub struct App {
    director: SceneDirector,
    frame_seconds: f64,
}

impl App {
    pub fn new(config: DemoConfig) -> Result<Self, TransportError> {
        info!("Thengill basic demo started");

        let socket = TcpSocket::bind(&config.session.address)?;
        let session = Rc::new(RefCell::new(NetworkSession::new(
            &config.session,
            Box::new(socket),
        )));

        let mut services = GameServices::headless().with_network(
            session,
            SyncConfig::default(),
            config.session.outbound_budget,
        );
        services.input = Rc::new(RefCell::new(StdinInput::spawn()));

        let mut director = SceneDirector::new();
        director.enter(scenes::lobby_scene(&services, config.lobby.clone()));

        Ok(Self {
            director,
            frame_seconds: config.frame_seconds(),
        })
    }

    /// Runs frames until the last scene is left.
    pub fn run(&mut self) {
        let frame = Duration::from_secs_f64(self.frame_seconds);
        let mut last = Instant::now();
        let mut scene = String::new();

        loop {
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f64();
            last = now;

            if self.director.frame(dt).is_none() {
                break;
            }
            if let Some(current) = self.director.current() {
                if current.name() != scene {
                    scene = current.name().to_string();
                    info!("Now in scene `{}`", scene);
                }
            }

            let spent = now.elapsed();
            if spent < frame {
                thread::sleep(frame - spent);
            }
        }
        info!("Thengill basic demo finished");
    }
}
