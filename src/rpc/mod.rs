//! Store and retrieve walks over the simulated network.
//!
//! Sending a request to a peer is a direct call here. Each call boundary is
//! where a networked node would send a request and wait for the response.

mod config;
mod peer;
mod query;

use std::num::NonZeroUsize;

use tracing::{debug, trace};

use crate::common::{Item, PeerAddr};
use crate::{Error, Result};

pub use config::Config;
pub use peer::Peer;
pub(crate) use query::Query;

/// Default forward budget, enough for a walk that gains one bit of prefix per hop.
pub const DEFAULT_MAX_HOPS: u8 = 160;

// Stored data per peer.
pub const DEFAULT_MAX_VALUES: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(max) => max,
    None => panic!("DEFAULT_MAX_VALUES is not zero"),
};

/// Route `item` toward the peer responsible for `query.target()`, starting at `at`.
///
/// Returns the address of the peer that holds (or already held) the item.
pub(crate) fn store(
    peers: &mut [Peer],
    at: PeerAddr,
    item: &Item,
    hops: u8,
    query: &mut Query,
) -> Result<PeerAddr> {
    let target = *query.target();
    let peer = peers.get(at.0).ok_or(Error::UnknownPeer(at))?;

    trace!(peer = ?peer.id(), ?target, hops, "Store request");

    if peer.id() == &target {
        debug!(peer = ?peer.id(), "Rejected store of a key hashing to the peer's own Id");
        return Err(Error::DegenerateKey);
    }

    // Already known, the existing item is kept as is.
    if let Some(node) = peer.routing_table().get(&target) {
        let holder = node.address();

        if holder == at {
            return Ok(at);
        }

        match peers.get(holder.0) {
            Some(holder_peer) if holder_peer.value(&target).is_some() => return Ok(holder),
            // A contact whose Id is the target: that peer is the closest possible
            // and would refuse the key, so nobody can hold it.
            Some(holder_peer) if holder_peer.id() == &target => {
                debug!(?target, "Rejected store of a key hashing to a known peer's Id");
                return Err(Error::DegenerateKey);
            }
            _ => {}
        }
    }

    if peer.routing_table().nodes().all(|node| node.address() == at) {
        return Err(Error::NoCandidate);
    }

    let candidates = peer.closer_candidates(&target);

    if candidates.is_empty() {
        let peer = peers.get_mut(at.0).ok_or(Error::UnknownPeer(at))?;
        peer.persist(target, item.clone())?;

        debug!(peer = ?peer.id(), ?target, visited = query.visited(), "Stored item");
        return Ok(at);
    }

    let next_hops = hops.checked_sub(1).ok_or(Error::MaxHopsExceeded {
        max_hops: query.max_hops(),
    })?;

    let mut last_error = None;

    for node in candidates {
        if !query.visit(node.address()) {
            continue;
        }

        match store(peers, node.address(), item, next_hops, query) {
            Ok(owner) => return Ok(owner),
            // The target is a peer's Id, no other peer can take it either.
            Err(Error::DegenerateKey) => return Err(Error::DegenerateKey),
            Err(error) => {
                trace!(?target, to = ?node.id(), ?error, "Store candidate failed");
                last_error = Some(error);
            }
        }
    }

    Err(last_error.unwrap_or(Error::NoCandidate))
}

/// Route a lookup for `query.target()` toward the peer holding it, starting at `at`.
///
/// Only items whose key hashes to the target are ever returned.
pub(crate) fn retrieve(peers: &[Peer], at: PeerAddr, hops: u8, query: &mut Query) -> Result<Item> {
    let target = *query.target();
    let peer = peers.get(at.0).ok_or(Error::UnknownPeer(at))?;

    trace!(peer = ?peer.id(), ?target, hops, "Retrieve request");

    let mut last_error = None;

    if let Some(item) = peer.value(&target) {
        if item.verify(&target) {
            return Ok(item.clone());
        }

        debug!(peer = ?peer.id(), ?target, "Stored item does not hash to its target");
        last_error = Some(Error::IntegrityMismatch);
    }

    // An entry for the target itself delegates to whoever it points at.
    let mut candidates: Vec<_> = peer
        .routing_table()
        .get(&target)
        .filter(|node| node.address() != at)
        .into_iter()
        .copied()
        .collect();
    candidates.extend(peer.closer_candidates(&target));

    if candidates.is_empty() {
        return Err(last_error.unwrap_or(Error::NotFound));
    }

    let next_hops = hops.checked_sub(1).ok_or(Error::MaxHopsExceeded {
        max_hops: query.max_hops(),
    })?;

    for node in candidates {
        if !query.visit(node.address()) {
            continue;
        }

        match retrieve(peers, node.address(), next_hops, query) {
            Ok(item) if item.verify(&target) => return Ok(item),
            Ok(_) => {
                debug!(?target, from = ?node.id(), "Item does not hash to the target, skipping");
                last_error = Some(Error::IntegrityMismatch);
            }
            Err(error) => {
                trace!(?target, to = ?node.id(), ?error, "Retrieve candidate failed");
                last_error = Some(error);
            }
        }
    }

    Err(last_error.unwrap_or(Error::NotFound))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Id, Testnet};

    #[test]
    fn failures_stay_in_their_branch() {
        let testnet = Testnet::builder(64).seed(11).build().unwrap();
        let peers = testnet.dht.peers();

        let target = Id::hash(b"never stored");
        let closest = testnet.closest_peer(&target, 0).unwrap();
        let other = *testnet
            .addresses
            .iter()
            .find(|address| **address != closest)
            .unwrap();

        let mut query = Query::new(target, 0);

        // No budget left to forward from a peer that knows closer peers.
        assert_eq!(
            retrieve(peers, other, 0, &mut query),
            Err(Error::MaxHopsExceeded { max_hops: 0 })
        );

        // The closest peer has nowhere to forward, the earlier branch's
        // failure is not its own.
        assert_eq!(
            retrieve(peers, closest, 0, &mut query),
            Err(Error::NotFound)
        );
    }
}
