use std::{
    cell::RefCell,
    collections::{HashSet, VecDeque},
    rc::Rc,
};

use log::{debug, info, trace, warn};

use thengill_shared::{
    names, EntityId, EventData, FrameTime, MenuItem, PeerMessage, Scene, SyncId, SyncKind,
    SyncMessage, System,
};

use crate::{
    session::{NetworkSession, SessionEvent},
    sync::ObjectSyncService,
};

/// Shared handle to the session, so it outlives the scenes that use it.
pub type SharedSession = Rc<RefCell<NetworkSession>>;

enum Outbound {
    MenuItem(MenuItem),
    GameEnd(EntityId),
}

/// Bridges a NetworkSession into a Scene.
///
/// Inbound traffic is applied in `begin_frame`, before any system updates.
/// Messages produced during the frame are queued and flushed in `end_frame`,
/// at most `outbound_budget` per frame. A queued snapshot is overwritten by a
/// newer one for the same `sync_id`, so the queue never holds more snapshots
/// than there are owned entities.
///
/// Once the scene requests a transition, the session events still unhandled
/// are handed back to the session, so the next scene sees them instead.
pub struct NetworkSystem {
    session: SharedSession,
    sync: ObjectSyncService,
    outbox: Rc<RefCell<Vec<Outbound>>>,
    pending: VecDeque<PeerMessage>,
    queued_syncs: HashSet<SyncId>,
    outbound_budget: usize,
    replicate: bool,
}

impl NetworkSystem {
    pub fn new(session: SharedSession, sync: ObjectSyncService, outbound_budget: usize) -> Self {
        Self {
            session,
            sync,
            outbox: Rc::new(RefCell::new(Vec::new())),
            pending: VecDeque::new(),
            queued_syncs: HashSet::new(),
            outbound_budget: outbound_budget.max(1),
            replicate: true,
        }
    }

    /// For scenes without replicated entities, like menus. Inbound `sync`
    /// and `gameEnd` messages are dropped instead of applied.
    pub fn without_replication(mut self) -> Self {
        self.replicate = false;
        self
    }

    pub fn replicates(&self) -> bool {
        self.replicate
    }

    pub fn sync(&self) -> &ObjectSyncService {
        &self.sync
    }

    pub fn pending_messages(&self) -> usize {
        self.pending.len()
    }

    fn enqueue_sync(&mut self, message: SyncMessage) {
        if !self.queued_syncs.contains(&message.sync_id) {
            self.queued_syncs.insert(message.sync_id.clone());
            self.pending.push_back(PeerMessage::Sync(message));
            return;
        }
        let queued = self.pending.iter_mut().find_map(|pending| match pending {
            PeerMessage::Sync(queued) if queued.sync_id == message.sync_id => Some(queued),
            _ => None,
        });
        if let Some(queued) = queued {
            // peers that never got the create must still get one
            let kind = match queued.kind {
                SyncKind::Create => SyncKind::Create,
                SyncKind::Update => message.kind,
            };
            trace!("Replacing queued snapshot of {}", message.sync_id);
            *queued = SyncMessage { kind, ..message };
        }
    }

    fn handle_session_event(&mut self, scene: &mut Scene, event: SessionEvent) {
        match event {
            SessionEvent::RosterChanged(peers) => {
                scene.set_authority(self.session.borrow().authority());
                scene.raise(names::UPDATE_PEERS, EventData::Peers(peers));
            }
            SessionEvent::PeerJoined(address) => {
                let snapshots = self.sync.snapshots_for_new_peer(scene);
                if snapshots.is_empty() {
                    return;
                }
                info!("Sending {} snapshot(s) to {}", snapshots.len(), address);
                let mut session = self.session.borrow_mut();
                for snapshot in snapshots {
                    if let Err(err) = session.send_to(&address, &PeerMessage::Sync(snapshot)) {
                        warn!("{}", err);
                        break;
                    }
                }
            }
            SessionEvent::PeerLeft(address) => {
                debug!("{} left the session", address);
            }
            SessionEvent::MasterLost(address) => {
                warn!("Scene `{}` lost its master {}", scene.name(), address);
            }
            SessionEvent::Message { from, message } => self.handle_message(scene, &from, message),
        }
    }

    fn handle_message(&mut self, scene: &mut Scene, from: &str, message: PeerMessage) {
        if !self.replicate && matches!(message, PeerMessage::Sync(_) | PeerMessage::GameEnd(_)) {
            debug!(
                "Scene `{}` does not replicate, dropping {} from {}",
                scene.name(),
                message.type_name(),
                from
            );
            return;
        }
        match message {
            PeerMessage::Sync(sync_message) => {
                if let Err(err) = self.sync.apply(scene, from, &sync_message) {
                    warn!("{}", err);
                }
            }
            PeerMessage::MenuItem(item) => {
                scene.raise(names::NETWORK_MENU_DATA_RECEIVED, EventData::MenuItem(item));
            }
            PeerMessage::GameEnd(game_end) => match self.sync.resolve_game_end(scene, &game_end) {
                Ok(entity) => scene.raise(names::GAME_END, EventData::Entity(entity)),
                Err(err) => warn!("Game end from {}: {}", from, err),
            },
            other => {
                trace!("Ignoring {} message from {}", other.type_name(), from);
            }
        }
    }
}

impl System for NetworkSystem {
    fn name(&self) -> &str {
        "NetworkSystem"
    }

    fn init(&mut self, scene: &mut Scene) {
        let outbox = self.outbox.clone();
        scene.on_event(names::SEND_MENU_ITEM, move |_, data| {
            let item = data.menu_item(names::SEND_MENU_ITEM)?;
            outbox.borrow_mut().push(Outbound::MenuItem(item.clone()));
            Ok(())
        });
        let outbox = self.outbox.clone();
        scene.on_event(names::NETWORK_GAME_END, move |_, data| {
            let entity = data.entity(names::NETWORK_GAME_END)?;
            outbox.borrow_mut().push(Outbound::GameEnd(entity));
            Ok(())
        });

        let (authority, peers) = {
            let session = self.session.borrow();
            (session.authority(), session.peers())
        };
        scene.set_authority(authority);
        scene.raise(names::UPDATE_PEERS, EventData::Peers(peers));
    }

    fn begin_frame(&mut self, scene: &mut Scene, _time: &FrameTime) {
        let events = {
            let mut session = self.session.borrow_mut();
            session.receive();
            let dropped = session.clear_errors();
            if dropped > 0 {
                trace!("{} session error(s) this frame", dropped);
            }
            session.take_events()
        };
        scene.set_authority(self.session.borrow().authority());

        let mut events = events.into_iter();
        while let Some(event) = events.next() {
            if scene.has_pending_transition() {
                let deferred: Vec<SessionEvent> = std::iter::once(event).chain(events).collect();
                debug!(
                    "Scene `{}` is leaving, deferring {} session event(s)",
                    scene.name(),
                    deferred.len()
                );
                self.session.borrow_mut().defer_events(deferred);
                break;
            }
            self.handle_session_event(scene, event);
        }
    }

    fn end_frame(&mut self, scene: &mut Scene, _time: &FrameTime) {
        let mut from_handlers = Vec::new();
        for outbound in self.outbox.borrow_mut().drain(..) {
            match outbound {
                Outbound::MenuItem(item) => from_handlers.push(PeerMessage::MenuItem(item)),
                Outbound::GameEnd(entity) => match self.sync.game_end_message(&entity) {
                    Ok(game_end) => from_handlers.push(PeerMessage::GameEnd(game_end)),
                    Err(err) => warn!("Cannot announce game end: {}", err),
                },
            }
        }

        // snapshots first, so a game end never names an id the peers lack
        for sync_message in self.sync.collect_outbound(scene) {
            self.enqueue_sync(sync_message);
        }
        self.pending.extend(from_handlers);

        let mut session = self.session.borrow_mut();
        let mut flushed = 0;
        while flushed < self.outbound_budget {
            let Some(message) = self.pending.pop_front() else {
                break;
            };
            if let PeerMessage::Sync(sync_message) = &message {
                self.queued_syncs.remove(&sync_message.sync_id);
            }
            session.broadcast(&message);
            flushed += 1;
        }
        if !self.pending.is_empty() {
            debug!(
                "Outbound budget reached, {} message(s) wait for the next frame",
                self.pending.len()
            );
        }
    }

    fn teardown(&mut self, _scene: &mut Scene) {
        self.outbox.borrow_mut().clear();
        self.pending.clear();
        self.queued_syncs.clear();
    }
}
