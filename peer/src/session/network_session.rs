use std::{
    collections::{HashMap, HashSet, VecDeque},
    time::{SystemTime, UNIX_EPOCH},
};

use log::{debug, error, info, trace, warn};

use thengill_shared::{
    decode, encode, Authority, Hello, NetworkPeer, PeerMessage, Roster as RosterMessage,
    RosterEntry,
};

use crate::transport::{LinkEvent, LinkId, LinkReceiver, LinkSender, PeerSocket};

use super::{
    error::SessionError, roster::Roster, session_config::SessionConfig,
    session_event::SessionEvent,
};

/// Membership and messaging for one peer of a full-mesh session.
///
/// Every link starts with both sides sending `hello`. The receiver of a hello
/// answers with its roster; a peer that learns of someone who joined earlier
/// than itself dials them, so late joiners end up connected to everyone.
/// The master is recomputed from the roster whenever it changes.
///
/// A peer started with seeds is joining until every seed has answered or
/// failed. Then it moves its `joined_at` past every settled member it heard
/// from and says hello again, so a clock running behind cannot make it master
/// of a session that already has one.
pub struct NetworkSession {
    sender: Box<dyn LinkSender>,
    receiver: Box<dyn LinkReceiver>,
    roster: Roster,
    links: HashMap<LinkId, Option<String>>,
    peer_links: HashMap<String, Vec<LinkId>>,
    dialing: HashSet<String>,
    pending_seeds: HashSet<String>,
    roster_dirty: bool,
    announced_master: Option<String>,
    events: VecDeque<SessionEvent>,
    errors: Vec<SessionError>,
}

impl NetworkSession {
    pub fn new(config: &SessionConfig, socket: Box<dyn PeerSocket>) -> Self {
        let (sender, receiver) = socket.open();
        let joined_at = config.joined_at.unwrap_or_else(now_millis);
        let local = RosterEntry::new(config.address.clone(), joined_at);
        info!(
            "Starting session as {} (joined at {})",
            local.address, local.joined_at
        );

        let mut session = Self {
            sender,
            receiver,
            roster: Roster::new(local),
            links: HashMap::new(),
            peer_links: HashMap::new(),
            dialing: HashSet::new(),
            pending_seeds: HashSet::new(),
            roster_dirty: true,
            announced_master: None,
            events: VecDeque::new(),
            errors: Vec::new(),
        };

        for seed in &config.peers {
            if session.dial(seed) {
                session.pending_seeds.insert(seed.clone());
            }
        }
        session.refresh();
        session
    }

    // Accessors

    pub fn local_address(&self) -> &str {
        &self.roster.local().address
    }

    pub fn local_entry(&self) -> &RosterEntry {
        self.roster.local()
    }

    /// Still waiting on a seed.
    pub fn is_joining(&self) -> bool {
        !self.pending_seeds.is_empty()
    }

    /// `Undecided` until every seed has answered or failed.
    pub fn authority(&self) -> Authority {
        if self.is_joining() {
            return Authority::Undecided;
        }
        if self.roster.master().address == self.roster.local().address {
            Authority::Master
        } else {
            Authority::Slave
        }
    }

    pub fn is_master(&self) -> bool {
        self.authority() == Authority::Master
    }

    pub fn master_address(&self) -> Option<String> {
        if self.is_joining() {
            return None;
        }
        Some(self.roster.master().address)
    }

    pub fn peers(&self) -> Vec<NetworkPeer> {
        self.roster.peers()
    }

    pub fn alive_peers(&self) -> Vec<String> {
        self.roster.alive_remote_addresses()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    /// Puts events back at the front of the queue, ahead of anything
    /// received later.
    pub fn defer_events(&mut self, events: Vec<SessionEvent>) {
        for event in events.into_iter().rev() {
            self.events.push_front(event);
        }
    }

    pub fn take_errors(&mut self) -> Vec<SessionError> {
        std::mem::take(&mut self.errors)
    }

    /// Forgets queued errors. Each one was logged when it was reported.
    /// Returns how many there were.
    pub fn clear_errors(&mut self) -> usize {
        let count = self.errors.len();
        self.errors.clear();
        count
    }

    // Inbound

    /// Drains everything the transport has received since the last call.
    pub fn receive(&mut self) {
        loop {
            match self.receiver.receive() {
                Ok(Some(event)) => self.handle_link_event(event),
                Ok(None) => break,
                Err(_) => {
                    self.report(SessionError::ReceiveFailed);
                    break;
                }
            }
        }
        self.refresh();
    }

    fn handle_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Connected(link) => {
                trace!("{:?} up", link);
                self.links.insert(link, None);
                let hello = self.hello();
                if let Err(err) = self.send_on_link(&link, &hello) {
                    self.report(err);
                }
            }
            LinkEvent::Received(link, payload) => match decode(&payload) {
                Ok(message) => self.handle_message(link, message),
                Err(error) => self.report(SessionError::Wire { link, error }),
            },
            LinkEvent::Disconnected(link) => self.handle_disconnect(link),
            LinkEvent::ConnectFailed(address) => {
                self.dialing.remove(&address);
                let was_seed = self.pending_seeds.remove(&address);
                self.report(SessionError::ConnectFailed { address });
                if was_seed && !self.is_joining() {
                    self.settle();
                }
            }
        }
    }

    fn handle_message(&mut self, link: LinkId, message: PeerMessage) {
        if let PeerMessage::Hello(hello) = message {
            self.handle_hello(link, hello);
            return;
        }
        let Some(Some(from)) = self.links.get(&link).cloned() else {
            self.report(SessionError::MessageBeforeHello {
                link,
                message_type: message.type_name(),
            });
            return;
        };
        match message {
            PeerMessage::Roster(roster) => self.handle_roster(roster),
            message => self.events.push_back(SessionEvent::Message { from, message }),
        }
    }

    fn handle_hello(&mut self, link: LinkId, hello: Hello) {
        if hello.address == self.roster.local().address {
            warn!("{:?} leads back to this peer, closing it", link);
            self.links.remove(&link);
            self.sender.disconnect(&link);
            return;
        }
        debug!("Hello from {} on {:?}", hello.address, link);

        self.links.insert(link, Some(hello.address.clone()));
        self.dialing.remove(&hello.address);

        let links = self.peer_links.entry(hello.address.clone()).or_default();
        let first_link = links.is_empty();
        if !links.contains(&link) {
            links.push(link);
        }

        let entry = RosterEntry::new(hello.address.clone(), hello.joined_at);
        let changed = if hello.joining {
            self.roster.upsert_joining(entry)
        } else {
            self.roster.upsert(entry)
        };
        if changed {
            self.roster_dirty = true;
        }
        if self.pending_seeds.remove(&hello.address) && !self.is_joining() {
            self.settle();
        }
        if first_link {
            info!("Peer {} joined", hello.address);
            self.events
                .push_back(SessionEvent::PeerJoined(hello.address.clone()));
            // gossip the new member so everyone can complete the mesh
            let roster = PeerMessage::Roster(RosterMessage {
                peers: self.roster.entries(),
            });
            self.broadcast(&roster);
        }
    }

    fn handle_roster(&mut self, roster: RosterMessage) {
        let local_key = {
            let local = self.roster.local();
            (local.joined_at, local.address.clone())
        };
        for entry in roster.peers {
            if self.roster.contains(&entry.address) || self.dialing.contains(&entry.address) {
                continue;
            }
            // later joiners dial earlier ones, so each pair gets one link
            if (entry.joined_at, entry.address.clone()) < local_key {
                self.dial(&entry.address);
            }
        }
    }

    fn handle_disconnect(&mut self, link: LinkId) {
        let Some(Some(address)) = self.links.remove(&link) else {
            trace!("{:?} down before its hello", link);
            return;
        };
        let Some(links) = self.peer_links.get_mut(&address) else {
            return;
        };
        links.retain(|other| *other != link);
        if !links.is_empty() {
            return;
        }
        self.peer_links.remove(&address);

        if self.roster.mark_dead(&address) {
            self.roster_dirty = true;
            info!("Peer {} left", address);
            self.events.push_back(SessionEvent::PeerLeft(address.clone()));
            if self.master_address().as_deref() == Some(address.as_str()) {
                error!(
                    "Lost the master {}. Replicated state will go stale; there is no re-election",
                    address
                );
                self.events.push_back(SessionEvent::MasterLost(address));
            }
        }
    }

    fn dial(&mut self, address: &str) -> bool {
        if address == self.roster.local().address || self.dialing.contains(address) {
            return false;
        }
        debug!("Dialing {}", address);
        match self.sender.connect(address) {
            Ok(()) => {
                self.dialing.insert(address.to_string());
                true
            }
            Err(_) => {
                self.report(SessionError::ConnectFailed {
                    address: address.to_string(),
                });
                false
            }
        }
    }

    fn hello(&self) -> PeerMessage {
        let local = self.roster.local();
        PeerMessage::Hello(Hello {
            address: local.address.clone(),
            joined_at: local.joined_at,
            joining: self.is_joining(),
        })
    }

    /// Ends the joining phase: the local join time moves after every settled
    /// member seen so far and every link gets the final hello.
    fn settle(&mut self) {
        let joined_at = self.roster.local().joined_at;
        if let Some(latest) = self.roster.latest_settled_join() {
            if latest >= joined_at {
                info!(
                    "Joining behind a member at {}, moving join time {} -> {}",
                    latest,
                    joined_at,
                    latest + 1
                );
                self.roster.set_local_joined_at(latest + 1);
                self.roster_dirty = true;
            }
        }
        let hello = self.hello();
        let links: Vec<LinkId> = self.links.keys().copied().collect();
        for link in links {
            if let Err(err) = self.send_on_link(&link, &hello) {
                self.report(err);
            }
        }
    }

    fn refresh(&mut self) {
        if self.is_joining() {
            return;
        }
        let master = self.master_address();
        if !self.roster_dirty && master == self.announced_master {
            return;
        }
        if master != self.announced_master {
            info!(
                "Master is {} ({:?} here)",
                master.as_deref().unwrap_or("nobody"),
                self.authority()
            );
        }
        self.roster_dirty = false;
        self.announced_master = master;
        self.events
            .push_back(SessionEvent::RosterChanged(self.roster.peers()));
    }

    // Outbound

    pub fn send_to(&mut self, address: &str, message: &PeerMessage) -> Result<(), SessionError> {
        let Some(link) = self
            .peer_links
            .get(address)
            .and_then(|links| links.first())
            .copied()
        else {
            return Err(SessionError::UnknownPeer {
                address: address.to_string(),
            });
        };
        self.send_on_link(&link, message)
    }

    /// Sends `message` to every live peer. Failures are queued as errors.
    /// Returns how many peers it was handed to.
    pub fn broadcast(&mut self, message: &PeerMessage) -> usize {
        let payload = match encode(message) {
            Ok(payload) => payload,
            Err(error) => {
                warn!("Dropping {} broadcast: {}", message.type_name(), error);
                return 0;
            }
        };
        let mut sent = 0;
        for address in self.roster.alive_remote_addresses() {
            let Some(link) = self
                .peer_links
                .get(&address)
                .and_then(|links| links.first())
                .copied()
            else {
                continue;
            };
            match self.sender.send(&link, &payload) {
                Ok(()) => sent += 1,
                Err(_) => self.report(SessionError::SendFailed {
                    link,
                    message_type: message.type_name(),
                }),
            }
        }
        sent
    }

    fn send_on_link(&self, link: &LinkId, message: &PeerMessage) -> Result<(), SessionError> {
        let payload = encode(message).map_err(|error| SessionError::Wire { link: *link, error })?;
        self.sender
            .send(link, &payload)
            .map_err(|_| SessionError::SendFailed {
                link: *link,
                message_type: message.type_name(),
            })
    }

    /// Closes every link.
    pub fn shutdown(&mut self) {
        for link in self.links.keys() {
            self.sender.disconnect(link);
        }
        self.links.clear();
        self.peer_links.clear();
    }

    fn report(&mut self, error: SessionError) {
        warn!("{}", error);
        self.errors.push(error);
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
