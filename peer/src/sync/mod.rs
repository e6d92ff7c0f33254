mod error;
mod object_sync;
mod sync_map;

pub use error::SyncError;
pub use object_sync::{ApplyOutcome, ObjectSyncService, SyncConfig};
pub use sync_map::SyncMap;
