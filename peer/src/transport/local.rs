//! In-process transport. Every socket created from one `LocalHub` can reach
//! every other by address; delivery is reliable, ordered and happens on the
//! next `receive`.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};

use log::{debug, warn};

use super::{LinkEvent, LinkId, LinkReceiver, LinkSender, PeerSocket, RecvError, SendError};

struct LinkEnds {
    ends: [String; 2],
}

impl LinkEnds {
    fn other(&self, address: &str) -> Option<&str> {
        if self.ends[0] == address {
            Some(&self.ends[1])
        } else if self.ends[1] == address {
            Some(&self.ends[0])
        } else {
            None
        }
    }
}

#[derive(Default)]
struct HubState {
    next_link: u64,
    inboxes: HashMap<String, VecDeque<LinkEvent>>,
    links: HashMap<LinkId, LinkEnds>,
}

impl HubState {
    fn push(&mut self, address: &str, event: LinkEvent) {
        if let Some(inbox) = self.inboxes.get_mut(address) {
            inbox.push_back(event);
        }
    }

    fn close_link(&mut self, link: &LinkId) {
        let Some(ends) = self.links.remove(link) else {
            return;
        };
        for address in ends.ends.iter() {
            self.push(address, LinkEvent::Disconnected(*link));
        }
    }
}

/// Shared switchboard for in-process peers.
#[derive(Clone, Default)]
pub struct LocalHub {
    state: Arc<Mutex<HubState>>,
}

impl LocalHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a socket reachable at `address`.
    pub fn socket(&self, address: &str) -> LocalSocket {
        LocalSocket {
            hub: self.clone(),
            address: address.to_string(),
        }
    }

    /// Drops every link of `address` and stops delivering to it, as if the
    /// process had died.
    pub fn disconnect_peer(&self, address: &str) {
        let mut state = self.lock();
        let links: Vec<LinkId> = state
            .links
            .iter()
            .filter(|(_, ends)| ends.other(address).is_some())
            .map(|(link, _)| *link)
            .collect();
        for link in links {
            state.close_link(&link);
        }
        state.inboxes.remove(address);
        debug!("LocalHub: {} disconnected", address);
    }

    pub fn link_count(&self) -> usize {
        self.lock().links.len()
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        // a panicking test thread must not wedge the other peers
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

pub struct LocalSocket {
    hub: LocalHub,
    address: String,
}

impl PeerSocket for LocalSocket {
    fn open(self: Box<Self>) -> (Box<dyn LinkSender>, Box<dyn LinkReceiver>) {
        {
            let mut state = self.hub.lock();
            if state.inboxes.contains_key(&self.address) {
                warn!("LocalHub: address {} opened twice", self.address);
            }
            state.inboxes.insert(self.address.clone(), VecDeque::new());
        }
        let sender = LocalLinkSender {
            hub: self.hub.clone(),
            address: self.address.clone(),
        };
        let receiver = LocalLinkReceiver {
            hub: self.hub,
            address: self.address,
        };
        (Box::new(sender), Box::new(receiver))
    }
}

struct LocalLinkSender {
    hub: LocalHub,
    address: String,
}

impl LinkSender for LocalLinkSender {
    fn send(&self, link: &LinkId, payload: &[u8]) -> Result<(), SendError> {
        let mut state = self.hub.lock();
        let Some(ends) = state.links.get(link) else {
            return Err(SendError);
        };
        let Some(other) = ends.other(&self.address).map(str::to_string) else {
            return Err(SendError);
        };
        state.push(&other, LinkEvent::Received(*link, payload.to_vec()));
        Ok(())
    }

    fn connect(&self, address: &str) -> Result<(), SendError> {
        let mut state = self.hub.lock();
        if !state.inboxes.contains_key(&self.address) {
            return Err(SendError);
        }
        if address == self.address || !state.inboxes.contains_key(address) {
            state.push(&self.address, LinkEvent::ConnectFailed(address.to_string()));
            return Ok(());
        }
        let link = LinkId(state.next_link);
        state.next_link += 1;
        state.links.insert(
            link,
            LinkEnds {
                ends: [self.address.clone(), address.to_string()],
            },
        );
        state.push(&self.address, LinkEvent::Connected(link));
        state.push(address, LinkEvent::Connected(link));
        Ok(())
    }

    fn disconnect(&self, link: &LinkId) {
        self.hub.lock().close_link(link);
    }

    fn local_address(&self) -> String {
        self.address.clone()
    }
}

struct LocalLinkReceiver {
    hub: LocalHub,
    address: String,
}

impl LinkReceiver for LocalLinkReceiver {
    fn receive(&mut self) -> Result<Option<LinkEvent>, RecvError> {
        let mut state = self.hub.lock();
        match state.inboxes.get_mut(&self.address) {
            Some(inbox) => Ok(inbox.pop_front()),
            None => Err(RecvError),
        }
    }
}
