use std::{fs, io};

use serde::Deserialize;
use thiserror::Error;

use thengill_game::lobby::LobbySettings;
use thengill_peer::SessionConfig;

/// Contains Config properties which will be used by the demo App
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub session: SessionConfig,
    pub lobby: LobbySettings,
    /// Target frames per second of the simulation loop
    pub frame_rate: Option<u32>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("Cannot parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl DemoConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::parse(path, &text)
    }

    fn parse(path: &str, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn frame_seconds(&self) -> f64 {
        1.0 / f64::from(self.frame_rate.unwrap_or(60).max(1))
    }
}
