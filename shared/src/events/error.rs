use thiserror::Error;

/// Returned by an event handler that could not process an event. The bus
/// logs it and keeps delivering to the remaining handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// Event carried a payload of an unexpected shape
    #[error("Event `{event}` expected a payload of kind {expected}, got {actual}")]
    UnexpectedPayload {
        event: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Payload referenced an entity that no longer exists
    #[error("Event `{event}` referenced an entity that is not alive: {entity}")]
    EntityNotAlive { event: String, entity: String },

    /// Handler specific failure
    #[error("Event handler failed: {0}")]
    Failed(String),
}
