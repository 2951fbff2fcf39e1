//! Struct and implementation of the Node entry in the Kademlia routing table
use std::fmt::{self, Debug, Display, Formatter};

use crate::common::Id;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Address of a peer inside the simulated network.
///
/// Stands in for a socket address: it is resolved through the network's
/// directory, so routing tables never hold references to other peers.
pub struct PeerAddr(pub(crate) usize);

impl PeerAddr {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Debug for PeerAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "PeerAddr({})", self.0)
    }
}

impl Display for PeerAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Node entry in Kademlia routing table
pub struct Node {
    id: Id,
    address: PeerAddr,
}

impl Node {
    /// Creates a new Node from an id and peer address.
    pub fn new(id: Id, address: PeerAddr) -> Node {
        Node { id, address }
    }

    // === Getters ===

    pub fn id(&self) -> &Id {
        &self.id
    }

    /// The peer that answers requests sent to this entry.
    pub fn address(&self) -> PeerAddr {
        self.address
    }

    // === Public Methods ===

    /// Returns true if both entries carry the same Id.
    pub fn same_id(&self, other: &Node) -> bool {
        self.id == other.id
    }
}
