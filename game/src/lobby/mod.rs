mod error;
mod lobby_settings;
mod lobby_system;
mod menu_action;

pub use error::LobbyError;
pub use lobby_settings::{LobbySettings, SETTING_LIMIT, SETTING_STEP};
pub use lobby_system::{LobbyRole, LobbySystem, CLICK_SOUND};
pub use menu_action::{dispatch, MenuAction, MenuEffect, MenuRow, DISPATCH_TABLE};
