use serde::{Deserialize, Serialize};

use thengill_shared::MenuCommand;

/// What the player did to the highlighted row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuAction {
    Select,
    Increase,
    Decrease,
}

impl MenuAction {
    pub fn from_command(command: MenuCommand) -> Option<Self> {
        match command {
            MenuCommand::Select => Some(MenuAction::Select),
            MenuCommand::Increase => Some(MenuAction::Increase),
            MenuCommand::Decrease => Some(MenuAction::Decrease),
            MenuCommand::Up | MenuCommand::Down | MenuCommand::Back => None,
        }
    }
}

/// Rows of the lobby menu, top to bottom. The discriminant is the row id
/// replicated to other peers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuRow {
    Map = 0,
    Flocks = 1,
    PowerUps = 2,
    Triggers = 3,
    StartGame = 4,
    Return = 5,
}

impl MenuRow {
    pub const ALL: [MenuRow; 6] = [
        MenuRow::Map,
        MenuRow::Flocks,
        MenuRow::PowerUps,
        MenuRow::Triggers,
        MenuRow::StartGame,
        MenuRow::Return,
    ];

    pub fn id(self) -> usize {
        self as usize
    }

    pub fn from_id(id: usize) -> Option<Self> {
        MenuRow::ALL.get(id).copied()
    }

    /// Rows whose value is a setting, and so are replicated.
    pub fn is_setting(self) -> bool {
        matches!(
            self,
            MenuRow::Map | MenuRow::Flocks | MenuRow::PowerUps | MenuRow::Triggers
        )
    }
}

/// Result of an action on a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "effect")]
pub enum MenuEffect {
    /// Step the row's setting forwards or backwards, optionally telling peers.
    Step { forward: bool, broadcast: bool },
    StartGame,
    Leave,
    Nothing,
}

/// (row, action) → effect. Pairs missing from the table do nothing.
pub const DISPATCH_TABLE: &[(MenuRow, MenuAction, MenuEffect)] = &[
    (MenuRow::Map, MenuAction::Select, MenuEffect::Step { forward: true, broadcast: false }),
    (MenuRow::Map, MenuAction::Increase, MenuEffect::Step { forward: true, broadcast: true }),
    (MenuRow::Map, MenuAction::Decrease, MenuEffect::Step { forward: false, broadcast: true }),
    (MenuRow::Flocks, MenuAction::Select, MenuEffect::Step { forward: true, broadcast: true }),
    (MenuRow::Flocks, MenuAction::Increase, MenuEffect::Step { forward: true, broadcast: true }),
    (MenuRow::Flocks, MenuAction::Decrease, MenuEffect::Step { forward: false, broadcast: true }),
    (MenuRow::PowerUps, MenuAction::Select, MenuEffect::Step { forward: true, broadcast: true }),
    (MenuRow::PowerUps, MenuAction::Increase, MenuEffect::Step { forward: true, broadcast: true }),
    (MenuRow::PowerUps, MenuAction::Decrease, MenuEffect::Step { forward: false, broadcast: true }),
    (MenuRow::Triggers, MenuAction::Select, MenuEffect::Step { forward: true, broadcast: true }),
    (MenuRow::Triggers, MenuAction::Increase, MenuEffect::Step { forward: true, broadcast: true }),
    (MenuRow::Triggers, MenuAction::Decrease, MenuEffect::Step { forward: false, broadcast: true }),
    (MenuRow::StartGame, MenuAction::Select, MenuEffect::StartGame),
    (MenuRow::Return, MenuAction::Select, MenuEffect::Leave),
];

pub fn dispatch(row: MenuRow, action: MenuAction) -> MenuEffect {
    DISPATCH_TABLE
        .iter()
        .find(|(table_row, table_action, _)| *table_row == row && *table_action == action)
        .map_or(MenuEffect::Nothing, |(_, _, effect)| *effect)
}
