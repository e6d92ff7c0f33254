use std::collections::HashMap;

use thengill_shared::{NetworkPeer, RosterEntry};

/// Master election: earliest `joined_at` wins, the smaller address breaks
/// ties. Independent of the order of `entries`.
pub fn elect_master(entries: &[RosterEntry]) -> Option<&RosterEntry> {
    entries.iter().min_by(|a, b| a.election_key().cmp(&b.election_key()))
}

struct PeerRecord {
    entry: RosterEntry,
    alive: bool,
    joining: bool,
}

/// Everyone this peer has completed a handshake with, plus itself.
pub struct Roster {
    local: RosterEntry,
    remote: HashMap<String, PeerRecord>,
}

impl Roster {
    pub fn new(local: RosterEntry) -> Self {
        Self {
            local,
            remote: HashMap::new(),
        }
    }

    pub fn local(&self) -> &RosterEntry {
        &self.local
    }

    /// Join time of the latest remote member that has settled its own.
    pub fn latest_settled_join(&self) -> Option<u64> {
        self.remote
            .values()
            .filter(|record| !record.joining)
            .map(|record| record.entry.joined_at)
            .max()
    }

    pub fn set_local_joined_at(&mut self, joined_at: u64) {
        self.local.joined_at = joined_at;
    }

    /// Adds or revives `entry`. Returns `true` if the roster changed.
    pub fn upsert(&mut self, entry: RosterEntry) -> bool {
        self.insert(entry, false)
    }

    /// Like [`Roster::upsert`] for a peer still waiting on its seeds. It is
    /// listed but cannot be master until it is upserted again.
    pub fn upsert_joining(&mut self, entry: RosterEntry) -> bool {
        self.insert(entry, true)
    }

    fn insert(&mut self, entry: RosterEntry, joining: bool) -> bool {
        if entry.address == self.local.address {
            return false;
        }
        let entry = RosterEntry {
            is_local: false,
            ..entry
        };
        match self.remote.get_mut(&entry.address) {
            Some(record) => {
                let changed = !record.alive || record.joining != joining || record.entry != entry;
                record.entry = entry;
                record.alive = true;
                record.joining = joining;
                changed
            }
            None => {
                self.remote.insert(
                    entry.address.clone(),
                    PeerRecord {
                        entry,
                        alive: true,
                        joining,
                    },
                );
                true
            }
        }
    }

    /// Marks `address` as gone. It stays in the roster. Returns `true` if it
    /// was alive.
    pub fn mark_dead(&mut self, address: &str) -> bool {
        match self.remote.get_mut(address) {
            Some(record) if record.alive => {
                record.alive = false;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, address: &str) -> bool {
        address == self.local.address || self.remote.contains_key(address)
    }

    pub fn is_alive(&self, address: &str) -> bool {
        address == self.local.address
            || self.remote.get(address).map_or(false, |record| record.alive)
    }

    /// Every entry in join order, the local one flagged `is_local`.
    pub fn entries(&self) -> Vec<RosterEntry> {
        let mut entries: Vec<RosterEntry> = self
            .remote
            .values()
            .map(|record| record.entry.clone())
            .collect();
        entries.push(RosterEntry {
            is_local: true,
            ..self.local.clone()
        });
        entries.sort_by(|a, b| a.election_key().cmp(&b.election_key()));
        entries
    }

    pub fn master(&self) -> RosterEntry {
        let mut candidates: Vec<RosterEntry> = self
            .remote
            .values()
            .filter(|record| !record.joining)
            .map(|record| record.entry.clone())
            .collect();
        candidates.push(self.local.clone());
        match elect_master(&candidates) {
            Some(master) => master.clone(),
            None => self.local.clone(),
        }
    }

    pub fn alive_remote_addresses(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self
            .remote
            .values()
            .filter(|record| record.alive)
            .map(|record| record.entry.address.clone())
            .collect();
        addresses.sort();
        addresses
    }

    /// Roster as delivered to gameplay, in join order.
    pub fn peers(&self) -> Vec<NetworkPeer> {
        let master = self.master();
        self.entries()
            .into_iter()
            .map(|entry| NetworkPeer {
                is_master: entry.address == master.address,
                alive: self.is_alive(&entry.address),
                address: entry.address,
                joined_at: entry.joined_at,
                is_local: entry.is_local,
            })
            .collect()
    }

    /// Number of entries, the local one included.
    pub fn len(&self) -> usize {
        self.remote.len() + 1
    }
}
