mod error;
mod network_session;
mod roster;
mod session_config;
mod session_event;

pub use error::SessionError;
pub use network_session::NetworkSession;
pub use roster::{elect_master, Roster};
pub use session_config::SessionConfig;
pub use session_event::SessionEvent;
