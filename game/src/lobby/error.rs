use thiserror::Error;

/// Errors raised while applying menu rows replicated from the lobby host
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LobbyError {
    /// The row id does not name a menu row
    #[error("Menu row {id} does not exist")]
    UnknownRow { id: usize },

    /// The row text could not be parsed back into a setting
    #[error("Menu row {id} carries text that is not a setting: `{text}`")]
    MalformedRow { id: usize, text: String },

    /// The host picked a map this peer does not know
    #[error("Map `{name}` is not installed on this peer. Every peer must ship the same maps")]
    UnknownMap { name: String },
}
