//! State shared by every hop of a single `put` or `get` walk.

use std::collections::HashSet;

use crate::common::{Id, PeerAddr};

/// A query walks from peer to peer toward the target, only ever moving to
/// strictly closer peers, and never visiting the same peer twice.
#[derive(Debug)]
pub struct Query {
    target: Id,
    max_hops: u8,
    visited: HashSet<PeerAddr>,
}

impl Query {
    pub fn new(target: Id, max_hops: u8) -> Self {
        Self {
            target,
            max_hops,
            visited: HashSet::new(),
        }
    }

    // === Getters ===

    pub fn target(&self) -> &Id {
        &self.target
    }

    pub fn max_hops(&self) -> u8 {
        self.max_hops
    }

    pub fn visited(&self) -> usize {
        self.visited.len()
    }

    // === Public Methods ===

    /// Marks `address` as visited, returns false if it already was.
    pub fn visit(&mut self, address: PeerAddr) -> bool {
        self.visited.insert(address)
    }
}
