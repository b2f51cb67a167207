//! Who can talk to whom, recomputed from current positions on every query.
//!
//! A direct link needs range (measured with the querying side's range), an
//! unobstructed line of sight, and both sides admitting each other's kind.
//! Relay satellites are transparent: whatever a reachable relay can reach is
//! reachable too. The walk over relays remembers which relays it has already
//! expanded, so relay chains that see each other terminate.

use crate::entity::{Entity, EntityKind, EntityMap};
use crate::geometry::{distance, is_visible};
use std::collections::{BTreeSet, HashSet};

/// Ids of every entity `id` can currently exchange data with.
///
/// Unknown ids reach nothing.
pub fn communicable(entities: &EntityMap, id: &str) -> BTreeSet<String> {
    let Some(origin) = entities.get(id) else {
        return BTreeSet::new();
    };

    let mut reached = direct_links(entities, origin);
    let mut expanded: HashSet<&str> = HashSet::from([id]);
    let mut pending: Vec<&str> = relays_in(entities, &reached);

    while let Some(relay_id) = pending.pop() {
        if !expanded.insert(relay_id) {
            continue;
        }
        let Some(relay) = entities.get(relay_id) else {
            continue;
        };
        for peer in direct_links(entities, relay) {
            if let Some((key, entity)) = entities.get_key_value(&peer) {
                if entity.kind() == EntityKind::RelaySatellite && !expanded.contains(key.as_str()) {
                    pending.push(key.as_str());
                }
            }
            reached.insert(peer);
        }
    }

    // Relayed peers still have to pass the origin's own allow-list
    reached.retain(|peer| {
        peer != id
            && entities
                .get(peer)
                .is_some_and(|entity| origin.admits(entity.kind()))
    });
    reached
}

/// True iff `to` is currently reachable from `from`.
pub fn can_reach(entities: &EntityMap, from: &str, to: &str) -> bool {
    communicable(entities, from).contains(to)
}

fn direct_links(entities: &EntityMap, origin: &Entity) -> BTreeSet<String> {
    entities
        .values()
        .filter(|peer| linkable(origin, peer))
        .map(|peer| peer.id().to_string())
        .collect()
}

fn relays_in<'a>(entities: &'a EntityMap, ids: &BTreeSet<String>) -> Vec<&'a str> {
    ids.iter()
        .filter_map(|id| entities.get_key_value(id))
        .filter(|(_, entity)| entity.kind() == EntityKind::RelaySatellite)
        .map(|(key, _)| key.as_str())
        .collect()
}

fn linkable(origin: &Entity, peer: &Entity) -> bool {
    if origin.id() == peer.id() {
        return false;
    }
    // Ground nodes never link to each other directly
    if origin.kind().is_device() && peer.kind().is_device() {
        return false;
    }
    if !origin.admits(peer.kind()) || !peer.admits(origin.kind()) {
        return false;
    }

    let d = distance(origin.height(), origin.position(), peer.height(), peer.position());
    if d == 0.0 && origin.kind().is_satellite() && peer.kind().is_satellite() {
        return false;
    }

    d < origin.capabilities().max_range
        && is_visible(origin.height(), origin.position(), peer.height(), peer.position())
}
