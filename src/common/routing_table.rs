//! Simplified Kademlia routing table

use std::collections::BTreeMap;
use std::slice::Iter;

use tracing::debug;

use crate::common::{ClosestNodes, Id, Node};
use crate::{Error, Result};

/// K = the default maximum size of a k-bucket.
pub const DEFAULT_K: usize = 3;

#[derive(Debug, Clone)]
/// Simplified Kademlia routing table
///
/// Buckets are keyed by the number of leading bits a contact shares with
/// this table's [Id], so only buckets that ever received a contact are allocated.
pub struct RoutingTable {
    id: Id,
    k: usize,
    buckets: BTreeMap<u8, KBucket>,
}

impl RoutingTable {
    /// Create a new [RoutingTable] with a given id and the [DEFAULT_K] bucket size.
    pub fn new(id: Id) -> Self {
        RoutingTable {
            id,
            k: DEFAULT_K,
            buckets: BTreeMap::new(),
        }
    }

    // === Options ===

    /// Set the maximum number of contacts per bucket.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    // === Getters ===

    /// Returns the [Id] of this node, where the distance is measured from.
    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn k(&self) -> usize {
        self.k
    }

    // === Public Methods ===

    /// Attempts to add a node to this routing table.
    ///
    /// Returns `Ok(true)` if it was added, `Ok(false)` if it is this table's own
    /// Id or already known, and [Error::BucketFull] if its bucket holds `k` entries.
    pub fn add(&mut self, node: Node) -> Result<bool> {
        let index = match self.id.bucket_index_of(node.id()) {
            Some(index) => index,
            // Do not add self to the routing_table
            None => return Ok(false),
        };

        let k = self.k;
        let bucket = self
            .buckets
            .entry(index)
            .or_insert_with(|| KBucket::new(index, k));

        let result = bucket.add(node);

        if result.is_err() {
            debug!(id = ?self.id, node = ?node.id(), index, "Rejected node, bucket is full");
        }

        result
    }

    /// Returns the contacts in the bucket at `index`, in insertion order.
    pub fn bucket(&self, index: u8) -> &[Node] {
        match self.buckets.get(&index) {
            Some(bucket) => &bucket.nodes,
            None => &[],
        }
    }

    /// Returns true if an entry with this Id is known.
    pub fn contains(&self, node_id: &Id) -> bool {
        match self.id.bucket_index_of(node_id) {
            Some(index) => self
                .buckets
                .get(&index)
                .map_or(false, |bucket| bucket.contains(node_id)),
            None => false,
        }
    }

    /// Returns the entry with this Id, if known.
    pub fn get(&self, node_id: &Id) -> Option<&Node> {
        let index = self.id.bucket_index_of(node_id)?;

        self.buckets
            .get(&index)?
            .iter()
            .find(|node| node.id() == node_id)
    }

    /// Return up to `k` known entries closest to the target, sorted by distance.
    ///
    /// Equal distances keep bucket-then-insertion order.
    pub fn closest(&self, target: &Id) -> Vec<Node> {
        let mut closest = ClosestNodes::new(*target, self.k);

        for node in self.nodes() {
            closest.add(*node);
        }

        closest.into_iter().collect()
    }

    /// Returns `true` if this routing table is empty.
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(|bucket| bucket.is_empty())
    }

    /// Return the number of nodes in this routing table.
    pub fn size(&self) -> usize {
        self.buckets
            .values()
            .fold(0, |acc, bucket| acc + bucket.nodes.len())
    }

    /// Returns an iterator over the nodes in this routing table,
    /// ordered by bucket index then insertion.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.buckets.values().flat_map(|bucket| bucket.iter())
    }
}

/// A capacity bounded list of contacts, kept in insertion order.
///
/// New contacts are rejected once the bucket is full.
#[derive(Debug, Clone)]
pub struct KBucket {
    index: u8,
    k: usize,
    nodes: Vec<Node>,
}

impl KBucket {
    pub fn new(index: u8, k: usize) -> Self {
        KBucket {
            index,
            k,
            nodes: Vec::with_capacity(k),
        }
    }

    // === Public Methods ===

    /// Returns `Ok(false)` if a node with the same Id is already in the bucket.
    pub fn add(&mut self, incoming: Node) -> Result<bool> {
        if self.nodes.iter().any(|n| n.same_id(&incoming)) {
            Ok(false)
        } else if self.nodes.len() < self.k {
            self.nodes.push(incoming);
            Ok(true)
        } else {
            Err(Error::BucketFull { index: self.index })
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.nodes.len() >= self.k
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn iter(&self) -> Iter<'_, Node> {
        self.nodes.iter()
    }

    fn contains(&self, id: &Id) -> bool {
        self.iter().any(|node| node.id() == id)
    }
}
