use thiserror::Error;

/// Errors that can occur while applying or producing sync messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A peer tried to overwrite an entity this peer owns
    #[error("Peer {from} sent state for {sync_id}, which is owned by this peer. Message dropped")]
    OwnedLocally { sync_id: String, from: String },

    /// Game end named a sync id with no local entity
    #[error("No local entity for sync id {sync_id}")]
    UnknownSyncId { sync_id: String },

    /// Entity referenced by a local event is not replicated
    #[error("Entity {entity} has no sync id. Only entities carrying a SyncObject can be referenced across peers")]
    NotReplicated { entity: String },
}
