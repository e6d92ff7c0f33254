use std::collections::{HashMap, VecDeque};

use log::trace;

use super::entity_id::EntityId;

struct EntityRecord {
    component_count: usize,
}

/// Allocates entity ids and tracks which of them are alive.
///
/// Destroyed ids are not recycled straight away: they sit in quarantine until
/// the next frame boundary (`end_frame`) so that events and network messages
/// queued during the current frame can never resolve to a recycled id. The
/// free pool is FIFO, so an id goes back out as late as possible.
pub struct EntityRegistry {
    next_id: u32,
    records: HashMap<EntityId, EntityRecord>,
    quarantine: Vec<EntityId>,
    free_pool: VecDeque<EntityId>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            records: HashMap::new(),
            quarantine: Vec::new(),
            free_pool: VecDeque::new(),
        }
    }

    /// Returns a fresh id. Never blocks.
    pub fn allocate(&mut self) -> EntityId {
        let entity = match self.free_pool.pop_front() {
            Some(recycled) => recycled,
            None => {
                let id = self.next_id;
                self.next_id = self
                    .next_id
                    .checked_add(1)
                    .expect("entity id space exhausted");
                EntityId::from_u32(id)
            }
        };

        if self
            .records
            .insert(entity, EntityRecord { component_count: 0 })
            .is_some()
        {
            panic!("EntityRegistry handed out {} while it was still alive", entity);
        }

        trace!("allocated entity {}", entity);
        entity
    }

    pub fn is_alive(&self, entity: &EntityId) -> bool {
        self.records.contains_key(entity)
    }

    /// Removes bookkeeping for an entity.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive, or still has components attached.
    /// The Scene detaches every component before destroying an entity, so
    /// either case is a local defect.
    pub fn destroy(&mut self, entity: &EntityId) {
        let Some(record) = self.records.get(entity) else {
            panic!("Cannot destroy entity {}: it is not alive", entity);
        };
        if record.component_count > 0 {
            panic!(
                "Cannot destroy entity {}: {} component(s) still attached",
                entity, record.component_count
            );
        }

        self.records.remove(entity);
        self.quarantine.push(*entity);
        trace!("destroyed entity {}", entity);
    }

    /// Records that the entity gained a component.
    pub fn attach(&mut self, entity: &EntityId) {
        let Some(record) = self.records.get_mut(entity) else {
            panic!("Cannot attach a component to dead entity {}", entity);
        };
        record.component_count += 1;
    }

    /// Records that the entity lost a component.
    pub fn detach(&mut self, entity: &EntityId) {
        let Some(record) = self.records.get_mut(entity) else {
            panic!("Cannot detach a component from dead entity {}", entity);
        };
        if record.component_count == 0 {
            panic!("Component count underflow for entity {}", entity);
        }
        record.component_count -= 1;
    }

    pub fn component_count(&self, entity: &EntityId) -> usize {
        self.records
            .get(entity)
            .map(|record| record.component_count)
            .unwrap_or(0)
    }

    /// Frame boundary: ids destroyed during the frame become reusable.
    pub fn end_frame(&mut self) {
        self.free_pool.extend(self.quarantine.drain(..));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All living entities, lowest id first.
    pub fn entities(&self) -> Vec<EntityId> {
        let mut output: Vec<EntityId> = self.records.keys().copied().collect();
        output.sort();
        output
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
