//! Main Crate Error

use crate::common::{Id, PeerAddr};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// kademlia-sim crate error enum.
pub enum Error {
    /// Id bytes of the wrong length.
    #[error("Invalid Id size, expected 20, got {0}")]
    InvalidIdSize(usize),

    /// Id string that is not 40 hex characters.
    #[error("Invalid Id encoding: {0}")]
    InvalidIdEncoding(String),

    /// The hash of the key is the storing peer's own Id.
    #[error("Key hashes to the Id of the peer storing it")]
    DegenerateKey,

    /// Inserting into a bucket that already holds `k` entries.
    #[error("Bucket {index} is full")]
    BucketFull { index: u8 },

    /// No peer could take the value, either because the routing table is empty
    /// or because every candidate failed.
    #[error("No candidate peer accepted the request")]
    NoCandidate,

    /// No reachable peer holds a verified item for the target.
    #[error("Value not found")]
    NotFound,

    /// A peer returned an item whose key does not hash to the requested target.
    #[error("Item does not hash to the requested target")]
    IntegrityMismatch,

    /// The walk ran out of hops before reaching a responsible peer.
    #[error("Max hops exceeded ({max_hops})")]
    MaxHopsExceeded { max_hops: u8 },

    /// The address is not part of the network.
    #[error("Unknown peer address: {0:?}")]
    UnknownPeer(PeerAddr),

    /// A peer with this Id was already added.
    #[error("Duplicate peer Id: {0}")]
    DuplicatePeer(Id),
}

/// Alias for `Result<T, kademlia_sim::Error>`.
pub type Result<T, E = Error> = core::result::Result<T, E>;
