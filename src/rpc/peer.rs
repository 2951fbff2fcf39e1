//! A single simulated peer: its routing table and its value store.

use lru::LruCache;

use crate::common::{ClosestNodes, Id, Item, Node, PeerAddr, RoutingTable};
use crate::rpc::Config;
use crate::Result;

#[derive(Debug)]
/// One node of the simulated network.
pub struct Peer {
    id: Id,
    address: PeerAddr,
    routing_table: RoutingTable,
    values: LruCache<Id, Item>,
}

impl Peer {
    pub(crate) fn new(id: Id, address: PeerAddr, config: &Config) -> Self {
        Peer {
            id,
            address,
            routing_table: RoutingTable::new(id).with_k(config.k),
            values: LruCache::new(config.max_values),
        }
    }

    // === Getters ===

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn address(&self) -> PeerAddr {
        self.address
    }

    /// The [Node] other peers should store to reach this peer.
    pub fn node(&self) -> Node {
        Node::new(self.id, self.address)
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    /// Returns the locally stored item for `target`, without touching its recency.
    pub fn value(&self, target: &Id) -> Option<&Item> {
        self.values.peek(target)
    }

    /// Number of items held by this peer.
    pub fn values_len(&self) -> usize {
        self.values.len()
    }

    // === Public Methods ===

    /// Add a contact to this peer's routing table.
    pub fn add_node(&mut self, node: Node) -> Result<bool> {
        self.routing_table.add(node)
    }

    /// The `k` known entries closest to `target`.
    pub fn find_node(&self, target: &Id) -> Vec<Node> {
        self.routing_table.closest(target)
    }

    /// The `k` known entries closest to `target` that lead to another peer
    /// strictly closer to `target` than this one, in distance order.
    ///
    /// Entries pointing back at this peer (its own items) are skipped before
    /// selecting, so they never crowd out real contacts.
    pub(crate) fn closer_candidates(&self, target: &Id) -> Vec<Node> {
        let own_distance = self.id.xor(target);
        let mut closest = ClosestNodes::new(*target, self.routing_table.k());

        for node in self.routing_table.nodes() {
            if node.address() != self.address && node.id().xor(target) < own_distance {
                closest.add(*node);
            }
        }

        closest.into_iter().collect()
    }

    /// Keep `item` in the value store and record an entry for its target
    /// pointing back at this peer.
    pub(crate) fn persist(&mut self, target: Id, item: Item) -> Result<()> {
        self.routing_table.add(Node::new(target, self.address))?;
        self.values.put(target, item);

        Ok(())
    }

    /// Store `item` directly, bypassing routing. Only used to simulate
    /// misbehaving peers in tests.
    #[cfg(test)]
    pub(crate) fn insert_raw(&mut self, target: Id, item: Item) {
        self.values.put(target, item);
    }
}
