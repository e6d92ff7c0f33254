use serde::{Deserialize, Serialize};

use crate::world::WorldConfig;

use super::{error::LobbyError, menu_action::MenuRow};

/// Every counter setting moves in steps of this size.
pub const SETTING_STEP: u32 = 5;
/// Counters wrap back to zero when they reach this value.
pub const SETTING_LIMIT: u32 = 55;

/// Contains the round settings chosen in the lobby
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LobbySettings {
    /// Maps that can be picked, in menu order
    pub maps: Vec<String>,
    pub map_index: usize,
    pub flocks: u32,
    pub power_ups: u32,
    pub triggers: u32,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            maps: vec!["DinoIsland".to_string()],
            map_index: 0,
            flocks: 0,
            power_ups: 0,
            triggers: 0,
        }
    }
}

impl LobbySettings {
    pub fn map(&self) -> &str {
        self.maps
            .get(self.map_index)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Moves the setting behind `row` one step. Returns `false` for rows that
    /// are not settings.
    pub fn step(&mut self, row: MenuRow, forward: bool) -> bool {
        match row {
            MenuRow::Map => {
                let count = self.maps.len().max(1);
                self.map_index = if forward {
                    (self.map_index + 1) % count
                } else {
                    (self.map_index + count - 1) % count
                };
            }
            MenuRow::Flocks => self.flocks = step_counter(self.flocks, forward),
            MenuRow::PowerUps => self.power_ups = step_counter(self.power_ups, forward),
            MenuRow::Triggers => self.triggers = step_counter(self.triggers, forward),
            MenuRow::StartGame | MenuRow::Return => return false,
        }
        true
    }

    pub fn label_text(&self, row: MenuRow) -> String {
        match row {
            MenuRow::Map => format!("{}{}", MAP_LABEL, self.map()),
            MenuRow::Flocks => format!("{}{}", FLOCKS_LABEL, self.flocks),
            MenuRow::PowerUps => format!("{}{}", POWER_UPS_LABEL, self.power_ups),
            MenuRow::Triggers => format!("{}{}", TRIGGERS_LABEL, self.triggers),
            MenuRow::StartGame => "Start Game".to_string(),
            MenuRow::Return => "Return".to_string(),
        }
    }

    /// Reads back a row rendered by `label_text` on another peer.
    pub fn apply_replicated(&mut self, row: MenuRow, text: &str) -> Result<(), LobbyError> {
        let malformed = || LobbyError::MalformedRow {
            id: row.id(),
            text: text.to_string(),
        };
        match row {
            MenuRow::Map => {
                let name = text.strip_prefix(MAP_LABEL).ok_or_else(malformed)?;
                let index = self
                    .maps
                    .iter()
                    .position(|map| map == name)
                    .ok_or_else(|| LobbyError::UnknownMap {
                        name: name.to_string(),
                    })?;
                self.map_index = index;
            }
            MenuRow::Flocks => self.flocks = parse_counter(text, FLOCKS_LABEL).ok_or_else(malformed)?,
            MenuRow::PowerUps => {
                self.power_ups = parse_counter(text, POWER_UPS_LABEL).ok_or_else(malformed)?
            }
            MenuRow::Triggers => {
                self.triggers = parse_counter(text, TRIGGERS_LABEL).ok_or_else(malformed)?
            }
            MenuRow::StartGame | MenuRow::Return => return Err(malformed()),
        }
        Ok(())
    }

    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            map: self.map().to_string(),
            flocks: self.flocks,
            power_ups: self.power_ups,
            triggers: self.triggers,
            ..WorldConfig::default()
        }
    }
}

const MAP_LABEL: &str = "Map: ";
const FLOCKS_LABEL: &str = "Flocks of Animals: ";
const POWER_UPS_LABEL: &str = "Number of Power-Ups: ";
const TRIGGERS_LABEL: &str = "Number of Triggers: ";

fn step_counter(value: u32, forward: bool) -> u32 {
    if forward {
        (value + SETTING_STEP) % SETTING_LIMIT
    } else if value > 0 {
        (value - SETTING_STEP.min(value)) % SETTING_LIMIT
    } else {
        SETTING_LIMIT - SETTING_STEP
    }
}

fn parse_counter(text: &str, label: &str) -> Option<u32> {
    text.strip_prefix(label)?.trim().parse().ok()
}
