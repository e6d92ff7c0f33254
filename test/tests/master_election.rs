use proptest::prelude::*;

use thengill_peer::{elect_master, session::Roster};
use thengill_shared::RosterEntry;

fn entry(address: &str, joined_at: u64, is_local: bool) -> RosterEntry {
    RosterEntry {
        address: address.to_string(),
        joined_at,
        is_local,
    }
}

#[test]
fn test_master_is_earliest_joiner_regardless_of_order() {
    let a = entry("A", 200, true);
    let b = entry("B", 100, false);

    let first = [a.clone(), b.clone()];
    let second = [b, a];

    assert_eq!(elect_master(&first).unwrap().address, "B");
    assert_eq!(elect_master(&second).unwrap().address, "B");
}

#[test]
fn test_roster_orders_peers_by_join_with_master_first() {
    let mut roster = Roster::new(entry("A", 200, false));
    roster.upsert(entry("C", 300, false));
    roster.upsert(entry("B", 100, false));

    let peers = roster.peers();
    let addresses: Vec<&str> = peers.iter().map(|peer| peer.address.as_str()).collect();
    assert_eq!(addresses, vec!["B", "A", "C"]);
    assert!(peers[0].is_master);
    assert!(peers[1].is_local);
}

fn roster_strategy() -> impl Strategy<Value = Vec<RosterEntry>> {
    prop::collection::btree_map(0u16..500, 0u64..50, 1..12).prop_map(|peers| {
        peers
            .into_iter()
            .map(|(port, joined_at)| entry(&format!("10.0.0.1:{}", port), joined_at, false))
            .collect()
    })
}

proptest! {
    /// Every peer computes the same master from the same roster contents
    #[test]
    fn prop_election_ignores_roster_order(
        (original, shuffled) in roster_strategy()
            .prop_flat_map(|entries| (Just(entries.clone()), Just(entries).prop_shuffle()))
    ) {
        let expected = elect_master(&original).unwrap().address.clone();
        prop_assert_eq!(&elect_master(&shuffled).unwrap().address, &expected);
    }

    /// The master joined no later than anyone else
    #[test]
    fn prop_master_has_the_smallest_join_time(entries in roster_strategy()) {
        let master = elect_master(&entries).unwrap();
        for entry in &entries {
            prop_assert!(master.joined_at <= entry.joined_at);
        }
    }

    /// Rosters built by different peers from the same members agree
    #[test]
    fn prop_rosters_agree_on_master(entries in roster_strategy()) {
        let masters: Vec<String> = entries
            .iter()
            .map(|local| {
                let mut roster = Roster::new(local.clone());
                for other in entries.iter().rev() {
                    roster.upsert(other.clone());
                }
                roster.master().address
            })
            .collect();
        for master in &masters {
            prop_assert_eq!(master, &masters[0]);
        }
    }

    /// A member still waiting on its seeds loses to anyone settled, whatever its clock
    #[test]
    fn prop_joining_member_is_never_master(entries in roster_strategy()) {
        let mut roster = Roster::new(entries[0].clone());
        for other in &entries[1..] {
            roster.upsert(other.clone());
        }
        roster.upsert_joining(entry("10.0.0.2:1", 0, false));

        let master = roster.master();
        prop_assert_ne!(master.address.as_str(), "10.0.0.2:1");
        prop_assert_eq!(roster.len(), entries.len() + 1);
    }
}
