use serde::{Deserialize, Serialize};

use super::{
    menu_item::MenuItem,
    roster::RosterEntry,
    sync_message::{SyncId, SyncMessage},
};

/// Introduction sent by both sides as soon as a link is up.
///
/// `joining` is set while the sender still waits for its seeds. Such a peer
/// cannot be elected; it sends a second hello, with its final `joined_at`,
/// once it has heard from them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hello {
    pub address: String,
    pub joined_at: u64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub joining: bool,
}

/// Every peer the sender knows of, in join order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub peers: Vec<RosterEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEnd {
    pub sync_id: SyncId,
}

/// Envelope of everything peers send each other.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PeerMessage {
    Hello(Hello),
    Roster(Roster),
    Sync(SyncMessage),
    MenuItem(MenuItem),
    GameEnd(GameEnd),
}

impl PeerMessage {
    pub fn type_name(&self) -> &'static str {
        match self {
            PeerMessage::Hello(_) => "hello",
            PeerMessage::Roster(_) => "roster",
            PeerMessage::Sync(_) => "sync",
            PeerMessage::MenuItem(_) => "menuItem",
            PeerMessage::GameEnd(_) => "gameEnd",
        }
    }
}
