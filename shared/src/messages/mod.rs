pub mod codec;
pub mod error;
pub mod menu_item;
pub mod peer_message;
pub mod roster;
pub mod sync_message;
