//! Event names shared by every scene and system.

/// Menu selection moved. Payload: `EventData::Index`.
pub const SELECTION_CHANGED: &str = "selchanged";
/// Roster changed. Payload: `EventData::Peers`, ordered by join order.
pub const UPDATE_PEERS: &str = "update_peers";
/// Menu item should be replicated to peers. Payload: `EventData::MenuItem`.
pub const SEND_MENU_ITEM: &str = "send_menuitem";
/// Menu item arrived from a peer. Payload: `EventData::MenuItem`.
pub const NETWORK_MENU_DATA_RECEIVED: &str = "network_menu_data_received";
/// An entity was hit. Payload: `EventData::Entity`.
pub const HIT: &str = "hit";
/// Two entities collided. Payload: `EventData::Collision`.
pub const COLLISION: &str = "collision";
/// The round ended locally. Payload: `EventData::Entity` (the winner).
pub const GAME_END: &str = "game_end";
/// The round ended and peers should be told. Payload: `EventData::Entity`.
pub const NETWORK_GAME_END: &str = "network_game_end";
