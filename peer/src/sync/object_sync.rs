use std::collections::{HashMap, HashSet};

use log::{debug, trace, warn};

use thengill_shared::{
    AssetLoader, Body, EntityId, GameEnd, Health, Model, Player, Scene, Score, SyncExtra, SyncId,
    SyncKind, SyncMessage, SyncObject, Transform,
};

use super::{error::SyncError, sync_map::SyncMap};

/// Contains Config properties which will be used by an ObjectSyncService
#[derive(Clone, Debug, PartialEq)]
pub struct SyncConfig {
    /// Frames between update broadcasts. Creates are never delayed.
    pub update_interval: u32,
    /// Prefix of assigned sync ids. Defaults to the session address.
    pub id_prefix: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            update_interval: 1,
            id_prefix: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created(EntityId),
    Updated(EntityId),
    /// Older than what was already applied; dropped.
    Stale,
}

/// Replicates entities carrying a `SyncObject`.
///
/// Entities created locally are *owned*: their state is broadcast. Entities
/// created from inbound messages are replicas: their state is overwritten by
/// whatever the owner sends. Both kinds share one `SyncMap`.
pub struct ObjectSyncService {
    config: SyncConfig,
    id_prefix: String,
    next_index: u64,
    map: SyncMap,
    owned: HashSet<SyncId>,
    announced: HashSet<SyncId>,
    sent_revisions: HashMap<SyncId, u64>,
    applied_revisions: HashMap<SyncId, u64>,
    dirty: HashSet<EntityId>,
    frames_since_update: u32,
    assets: Box<dyn AssetLoader>,
}

impl ObjectSyncService {
    pub fn new(config: SyncConfig, local_address: &str, assets: Box<dyn AssetLoader>) -> Self {
        let id_prefix = config
            .id_prefix
            .clone()
            .unwrap_or_else(|| local_address.to_string());
        Self {
            config,
            id_prefix,
            next_index: 0,
            map: SyncMap::new(),
            owned: HashSet::new(),
            announced: HashSet::new(),
            sent_revisions: HashMap::new(),
            applied_revisions: HashMap::new(),
            dirty: HashSet::new(),
            frames_since_update: 0,
            assets,
        }
    }

    pub fn sync_map(&self) -> &SyncMap {
        &self.map
    }

    pub fn entity_for(&self, sync_id: &SyncId) -> Option<EntityId> {
        self.map.entity(sync_id)
    }

    pub fn sync_id_of(&self, entity: &EntityId) -> Option<&SyncId> {
        self.map.sync_id(entity)
    }

    pub fn is_owned(&self, entity: &EntityId) -> bool {
        self.map
            .sync_id(entity)
            .map_or(false, |sync_id| self.owned.contains(sync_id))
    }

    // Outbound

    /// Messages describing every owned entity that appeared or was written to
    /// since the last call.
    ///
    /// Drains the Scene's change marks.
    pub fn collect_outbound(&mut self, scene: &mut Scene) -> Vec<SyncMessage> {
        self.adopt_new_entities(scene);
        self.forget_removed_entities(scene);

        self.dirty.extend(scene.take_changed_entities());
        self.frames_since_update += 1;
        let send_updates = self.frames_since_update >= self.config.update_interval.max(1);

        let mut messages = Vec::new();
        for (entity, sync_object) in scene.get_components::<SyncObject>() {
            let Some(sync_id) = sync_object.sync_id else {
                continue;
            };
            if !self.owned.contains(&sync_id) || self.map.entity(&sync_id) != Some(entity) {
                continue;
            }
            if !self.announced.contains(&sync_id) {
                self.announced.insert(sync_id.clone());
                self.dirty.remove(&entity);
                let revision = self.next_revision(&sync_id);
                messages.push(snapshot(scene, &entity, sync_id, SyncKind::Create, revision));
            } else if send_updates && self.dirty.contains(&entity) {
                let revision = self.next_revision(&sync_id);
                messages.push(snapshot(scene, &entity, sync_id, SyncKind::Update, revision));
            }
        }

        if send_updates {
            self.frames_since_update = 0;
            self.dirty.clear();
        }
        if !messages.is_empty() {
            trace!("{} sync message(s) to broadcast", messages.len());
        }
        messages
    }

    /// `create` snapshots of every owned entity already announced, for a peer
    /// that just joined.
    pub fn snapshots_for_new_peer(&self, scene: &Scene) -> Vec<SyncMessage> {
        let mut messages = Vec::new();
        for (entity, sync_object) in scene.get_components::<SyncObject>() {
            let Some(sync_id) = sync_object.sync_id else {
                continue;
            };
            if !self.announced.contains(&sync_id) || self.map.entity(&sync_id) != Some(entity) {
                continue;
            }
            let revision = self.sent_revisions.get(&sync_id).copied().unwrap_or(0);
            messages.push(snapshot(scene, &entity, sync_id, SyncKind::Create, revision));
        }
        messages
    }

    fn adopt_new_entities(&mut self, scene: &mut Scene) {
        for (entity, sync_object) in scene.get_components::<SyncObject>() {
            if self.map.sync_id(&entity).is_some() {
                continue;
            }
            let sync_id = match sync_object.sync_id {
                Some(sync_id) => {
                    if let Some(other) = self.map.entity(&sync_id) {
                        warn!(
                            "Entity {} reuses sync id {} of entity {}, not replicating it",
                            entity, sync_id, other
                        );
                        continue;
                    }
                    sync_id
                }
                None => {
                    let sync_id = SyncId::from(format!("{}/{}", self.id_prefix, self.next_index));
                    self.next_index += 1;
                    if let Some(component) = scene.get_component_mut::<SyncObject>(&entity) {
                        component.sync_id = Some(sync_id.clone());
                    }
                    sync_id
                }
            };
            debug!("Replicating entity {} as {}", entity, sync_id);
            self.map.insert(sync_id.clone(), entity);
            self.owned.insert(sync_id);
        }
    }

    fn forget_removed_entities(&mut self, scene: &Scene) {
        let removed: Vec<SyncId> = self
            .owned
            .iter()
            .filter(|sync_id| {
                self.map
                    .entity(sync_id)
                    .map_or(true, |entity| !scene.is_alive(&entity))
            })
            .cloned()
            .collect();
        for sync_id in removed {
            debug!("Owned entity {} was removed, no longer replicating it", sync_id);
            self.map.remove_by_sync_id(&sync_id);
            self.owned.remove(&sync_id);
            self.announced.remove(&sync_id);
            self.sent_revisions.remove(&sync_id);
        }
    }

    fn next_revision(&mut self, sync_id: &SyncId) -> u64 {
        let revision = self.sent_revisions.entry(sync_id.clone()).or_insert(0);
        *revision += 1;
        *revision
    }

    // Inbound

    /// Applies a snapshot received from `from`.
    ///
    /// Unknown ids create an entity, known ids are overwritten in place. A
    /// repeated `create` behaves like an `update`.
    pub fn apply(
        &mut self,
        scene: &mut Scene,
        from: &str,
        message: &SyncMessage,
    ) -> Result<ApplyOutcome, SyncError> {
        let sync_id = &message.sync_id;
        if self.owned.contains(sync_id) {
            return Err(SyncError::OwnedLocally {
                sync_id: sync_id.to_string(),
                from: from.to_string(),
            });
        }
        if let Some(last) = self.applied_revisions.get(sync_id) {
            if message.revision < *last {
                debug!(
                    "Dropping revision {} of {}, already at {}",
                    message.revision, sync_id, last
                );
                return Ok(ApplyOutcome::Stale);
            }
        }

        let outcome = match self.map.entity(sync_id) {
            Some(entity) if scene.is_alive(&entity) => {
                if message.kind == SyncKind::Create {
                    trace!("Repeated create of {}, applying as update", sync_id);
                }
                self.write_state(scene, &entity, message);
                ApplyOutcome::Updated(entity)
            }
            mapped => {
                if let Some(stale) = mapped {
                    debug!(
                        "Replica {} of {} was removed locally, recreating it",
                        stale, sync_id
                    );
                    self.map.remove_by_sync_id(sync_id);
                }
                let entity = scene.add_entity();
                scene.add_component(&entity, SyncObject::with_id(sync_id.clone(), message.file_name.clone()));
                self.write_state(scene, &entity, message);
                self.map.insert(sync_id.clone(), entity);
                debug!("Created replica {} for {} from {}", entity, sync_id, from);
                ApplyOutcome::Created(entity)
            }
        };
        self.applied_revisions
            .insert(sync_id.clone(), message.revision);
        Ok(outcome)
    }

    fn write_state(&mut self, scene: &mut Scene, entity: &EntityId, message: &SyncMessage) {
        scene.add_component(entity, message.transform);

        let model_matches = scene
            .get_component_from_entity::<Model>(entity)
            .map_or(false, |model| model.file_name == message.file_name);
        if !model_matches {
            let handle = self.assets.load_model(&message.file_name);
            scene.add_component(
                entity,
                Model {
                    file_name: message.file_name.clone(),
                    handle,
                },
            );
            if let Some(sync_object) = scene.get_component_mut::<SyncObject>(entity) {
                sync_object.file_name = message.file_name.clone();
            }
        }

        let extra = &message.extra;
        replace_optional(scene, entity, extra.body);
        replace_optional(scene, entity, extra.health);
        replace_optional(scene, entity, extra.score);
        replace_optional(scene, entity, extra.player.then_some(Player));
    }

    // Game end

    pub fn game_end_message(&self, entity: &EntityId) -> Result<GameEnd, SyncError> {
        match self.map.sync_id(entity) {
            Some(sync_id) => Ok(GameEnd {
                sync_id: sync_id.clone(),
            }),
            None => Err(SyncError::NotReplicated {
                entity: entity.to_string(),
            }),
        }
    }

    pub fn resolve_game_end(&self, scene: &Scene, game_end: &GameEnd) -> Result<EntityId, SyncError> {
        match self.map.entity(&game_end.sync_id) {
            Some(entity) if scene.is_alive(&entity) => Ok(entity),
            _ => Err(SyncError::UnknownSyncId {
                sync_id: game_end.sync_id.to_string(),
            }),
        }
    }
}

fn replace_optional<C: thengill_shared::Component>(
    scene: &mut Scene,
    entity: &EntityId,
    component: Option<C>,
) {
    match component {
        Some(component) => scene.add_component(entity, component),
        None => {
            scene.remove_component::<C>(entity);
        }
    }
}

fn snapshot(
    scene: &Scene,
    entity: &EntityId,
    sync_id: SyncId,
    kind: SyncKind,
    revision: u64,
) -> SyncMessage {
    let file_name = scene
        .get_component_from_entity::<SyncObject>(entity)
        .map(|sync_object| sync_object.file_name.clone())
        .unwrap_or_default();
    let transform = scene
        .get_component_from_entity::<Transform>(entity)
        .copied()
        .unwrap_or_default();
    SyncMessage {
        sync_id,
        kind,
        file_name,
        transform,
        extra: SyncExtra {
            body: scene.get_component_from_entity::<Body>(entity).copied(),
            health: scene.get_component_from_entity::<Health>(entity).copied(),
            score: scene.get_component_from_entity::<Score>(entity).copied(),
            player: scene.entity_has_component::<Player>(entity),
        },
        revision,
    }
}
