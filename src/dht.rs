//! Simulated Dht network.

use std::collections::HashMap;

use bytes::Bytes;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::{debug, info};

use crate::{
    common::{Id, Item, Node, PeerAddr},
    rpc::{self, Config, Peer, Query},
    Error, Result,
};

#[derive(Debug)]
/// An in-process network of peers.
///
/// Peers live in an arena and refer to each other by [PeerAddr], resolved
/// through this network. Every request is a direct, synchronous call.
pub struct Dht {
    config: Config,
    peers: Vec<Peer>,
    directory: HashMap<Id, PeerAddr>,
}

impl Default for Dht {
    fn default() -> Self {
        Dht::new(Config::default())
    }
}

impl Dht {
    pub fn new(config: Config) -> Self {
        Dht {
            config,
            peers: Vec::new(),
            directory: HashMap::new(),
        }
    }

    // === Getters ===

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of peers in the network.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn peer(&self, address: PeerAddr) -> Option<&Peer> {
        self.peers.get(address.0)
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    /// Look up the address of the peer with this Id.
    pub fn address_of(&self, id: &Id) -> Option<PeerAddr> {
        self.directory.get(id).copied()
    }

    // === Public Methods ===

    /// Add a peer with an empty routing table.
    pub fn add_peer(&mut self, id: Id) -> Result<PeerAddr> {
        if self.directory.contains_key(&id) {
            return Err(Error::DuplicatePeer(id));
        }

        let address = PeerAddr(self.peers.len());

        self.peers.push(Peer::new(id, address, &self.config));
        self.directory.insert(id, address);

        Ok(address)
    }

    /// Make `to` a contact of `from`.
    ///
    /// Returns `Ok(false)` if `from` already knows `to` or they are the same peer.
    pub fn introduce(&mut self, from: PeerAddr, to: PeerAddr) -> Result<bool> {
        let node = self.peer(to).ok_or(Error::UnknownPeer(to))?.node();

        self.peer_mut(from)?.add_node(node)
    }

    /// The `k` entries of `from`'s routing table closest to `target`, closest first.
    pub fn find_node(&self, from: PeerAddr, target: Id) -> Result<Vec<Node>> {
        let peer = self.peer(from).ok_or(Error::UnknownPeer(from))?;

        Ok(peer.find_node(&target))
    }

    /// Store `value` under the hash of `key`, starting the walk at `from`.
    ///
    /// Returns the address of the peer holding the item. Storing a key that is
    /// already held succeeds without replacing the existing value.
    pub fn put(&mut self, from: PeerAddr, key: &[u8], value: &[u8]) -> Result<PeerAddr> {
        let item = Item::new(Bytes::copy_from_slice(key), Bytes::copy_from_slice(value));

        self.put_item(from, item)
    }

    /// Retrieve the item stored under `target`, starting the walk at `from`.
    ///
    /// The returned item always hashes to `target`. Never modifies any peer.
    pub fn get(&self, from: PeerAddr, target: Id) -> Result<Item> {
        self.peer(from).ok_or(Error::UnknownPeer(from))?;

        let mut query = Query::new(target, self.config.max_hops);
        query.visit(from);

        let result = rpc::retrieve(&self.peers, from, self.config.max_hops, &mut query);

        debug!(?target, ?from, visited = query.visited(), found = result.is_ok(), "Get done");

        result.map_err(|error| match error {
            Error::IntegrityMismatch => Error::NotFound,
            error => error,
        })
    }

    /// Store a value under its own hash, returning that hash.
    pub fn put_immutable(&mut self, from: PeerAddr, value: &[u8]) -> Result<Id> {
        let item = Item::immutable(Bytes::copy_from_slice(value));
        let target = item.target();

        self.put_item(from, item)?;

        Ok(target)
    }

    /// Get a value stored with [Dht::put_immutable]; it hashes to `target`.
    pub fn get_immutable(&self, from: PeerAddr, target: Id) -> Result<Bytes> {
        Ok(self.get(from, target)?.value)
    }

    // === Private Methods ===

    fn peer_mut(&mut self, address: PeerAddr) -> Result<&mut Peer> {
        self.peers
            .get_mut(address.0)
            .ok_or(Error::UnknownPeer(address))
    }

    fn put_item(&mut self, from: PeerAddr, item: Item) -> Result<PeerAddr> {
        self.peer(from).ok_or(Error::UnknownPeer(from))?;

        let target = item.target();
        let mut query = Query::new(target, self.config.max_hops);
        query.visit(from);

        let result = rpc::store(
            &mut self.peers,
            from,
            &item,
            self.config.max_hops,
            &mut query,
        );

        match &result {
            Ok(owner) => {
                debug!(?target, ?from, ?owner, visited = query.visited(), "Put done")
            }
            Err(error) => {
                debug!(?target, ?from, ?error, visited = query.visited(), "Put failed")
            }
        }

        result
    }

    #[cfg(test)]
    pub(crate) fn peer_mut_for_test(&mut self, address: PeerAddr) -> &mut Peer {
        &mut self.peers[address.0]
    }
}

#[derive(Debug)]
/// A seeded, deterministic network where every peer knows as many of the
/// peers in its partition as its buckets can hold.
///
/// Peer `i` has the Id `hash("peer-{i}")` and belongs to partition `i % partitions`.
pub struct Testnet {
    pub dht: Dht,
    pub addresses: Vec<PeerAddr>,
    partitions: usize,
}

impl Testnet {
    /// A single partition Testnet with the default seed and [Config].
    pub fn new(size: usize) -> Result<Testnet> {
        Testnet::builder(size).build()
    }

    pub fn builder(size: usize) -> TestnetBuilder {
        TestnetBuilder {
            size,
            seed: 0,
            partitions: 1,
            config: Config::default(),
        }
    }

    /// The partition a peer belongs to; peers only know peers of their own partition.
    pub fn partition_of(&self, address: PeerAddr) -> usize {
        address.0 % self.partitions
    }

    /// The peer of `partition` whose Id is closest to `target`, found by
    /// checking every peer.
    pub fn closest_peer(&self, target: &Id, partition: usize) -> Option<PeerAddr> {
        self.dht
            .peers()
            .iter()
            .filter(|peer| self.partition_of(peer.address()) == partition)
            .min_by_key(|peer| peer.id().xor(target))
            .map(|peer| peer.address())
    }
}

#[derive(Debug, Clone)]
/// Builder for [Testnet].
pub struct TestnetBuilder {
    size: usize,
    seed: u64,
    partitions: usize,
    config: Config,
}

impl TestnetBuilder {
    /// Seed of the rng shuffling the order in which peers learn about each other.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Split peers into `partitions` groups that never learn about each other.
    pub fn partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions.max(1);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Testnet> {
        let mut dht = Dht::new(self.config);

        let addresses = (0..self.size)
            .map(|i| dht.add_peer(Id::hash(format!("peer-{i}"))))
            .collect::<Result<Vec<_>>>()?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let partitions = self.partitions;

        for &from in &addresses {
            let mut others: Vec<PeerAddr> = addresses
                .iter()
                .copied()
                .filter(|to| *to != from && to.0 % partitions == from.0 % partitions)
                .collect();
            others.shuffle(&mut rng);

            for to in others {
                match dht.introduce(from, to) {
                    Ok(_) | Err(Error::BucketFull { .. }) => {}
                    Err(error) => return Err(error),
                }
            }
        }

        info!(size = self.size, partitions, seed = self.seed, "Testnet ready");

        Ok(Testnet {
            dht,
            addresses,
            partitions,
        })
    }
}
