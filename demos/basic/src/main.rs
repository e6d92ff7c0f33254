//! Runs one Thengill peer over TCP with headless collaborators. Menu input is
//! read from stdin, one command per line.
//!
//! Usage: `thengill-basic-demo [config.toml]`

mod app;
mod config;
mod stdin_input;

use log::error;

use app::App;
use config::DemoConfig;

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match DemoConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                error!("{}", err);
                std::process::exit(1);
            }
        },
        None => DemoConfig::default(),
    };

    match App::new(config) {
        Ok(mut app) => app.run(),
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    }
}
