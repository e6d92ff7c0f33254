use std::collections::HashMap;

use thengill_shared::{EntityId, SyncId};

/// Bijection between network-stable sync ids and local entities.
pub struct SyncMap {
    sync_to_entity: HashMap<SyncId, EntityId>,
    entity_to_sync: HashMap<EntityId, SyncId>,
}

impl SyncMap {
    pub fn new() -> Self {
        Self {
            sync_to_entity: HashMap::new(),
            entity_to_sync: HashMap::new(),
        }
    }

    /// Panics if either side is already mapped.
    pub fn insert(&mut self, sync_id: SyncId, entity: EntityId) {
        if let Some(existing) = self.sync_to_entity.get(&sync_id) {
            panic!(
                "Sync id {} is already mapped to entity {}, cannot map it to {}",
                sync_id, existing, entity
            );
        }
        if let Some(existing) = self.entity_to_sync.get(&entity) {
            panic!(
                "Entity {} is already mapped to sync id {}, cannot map it to {}",
                entity, existing, sync_id
            );
        }
        self.sync_to_entity.insert(sync_id.clone(), entity);
        self.entity_to_sync.insert(entity, sync_id);
    }

    pub fn entity(&self, sync_id: &SyncId) -> Option<EntityId> {
        self.sync_to_entity.get(sync_id).copied()
    }

    pub fn sync_id(&self, entity: &EntityId) -> Option<&SyncId> {
        self.entity_to_sync.get(entity)
    }

    pub fn remove_by_sync_id(&mut self, sync_id: &SyncId) -> Option<EntityId> {
        let entity = self.sync_to_entity.remove(sync_id)?;
        if self.entity_to_sync.remove(&entity).is_none() {
            panic!(
                "Sync map out of balance: {} -> {} has no reverse entry",
                sync_id, entity
            );
        }
        Some(entity)
    }

    pub fn remove_by_entity(&mut self, entity: &EntityId) -> Option<SyncId> {
        let sync_id = self.entity_to_sync.remove(entity)?;
        if self.sync_to_entity.remove(&sync_id).is_none() {
            panic!(
                "Sync map out of balance: {} -> {} has no reverse entry",
                entity, sync_id
            );
        }
        Some(sync_id)
    }

    pub fn len(&self) -> usize {
        self.sync_to_entity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sync_to_entity.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&SyncId, &EntityId)> {
        self.sync_to_entity.iter()
    }
}

impl Default for SyncMap {
    fn default() -> Self {
        Self::new()
    }
}
