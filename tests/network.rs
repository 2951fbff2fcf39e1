//! Network level behaviour of `put`, `get` and `find_node` over seeded testnets.

use kademlia_sim::{Error, Id, Node, PeerAddr, Testnet};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

const PEERS: usize = 160;

fn snapshot(testnet: &Testnet) -> Vec<Vec<Node>> {
    testnet
        .dht
        .peers()
        .iter()
        .map(|peer| peer.routing_table().nodes().copied().collect())
        .collect()
}

#[test]
fn store_then_retrieve_from_every_peer() {
    let mut testnet = Testnet::builder(PEERS).seed(0).build().unwrap();
    let target = Id::hash(b"key-0");

    let origin = testnet.addresses[17];
    let owner = testnet.dht.put(origin, b"key-0", b"value-0").unwrap();

    assert_eq!(Some(owner), testnet.closest_peer(&target, 0));

    for &address in &testnet.addresses {
        let item = testnet.dht.get(address, target).unwrap();

        assert_eq!(Id::hash(&item.key), target);
        assert_eq!(&item.value[..], b"value-0");
    }
}

#[test]
fn partitioned_network() {
    let mut testnet = Testnet::builder(PEERS)
        .seed(3)
        .partitions(2)
        .build()
        .unwrap();
    let target = Id::hash(b"key-0");

    let origin = testnet.addresses[0];
    assert_eq!(testnet.partition_of(origin), 0);

    let owner = testnet.dht.put(origin, b"key-0", b"value-0").unwrap();
    assert_eq!(Some(owner), testnet.closest_peer(&target, 0));

    for &address in &testnet.addresses {
        let result = testnet.dht.get(address, target);

        if testnet.partition_of(address) == 0 {
            assert!(result.unwrap().verify(&target));
        } else {
            assert_eq!(result, Err(Error::NotFound));
        }
    }
}

#[test]
fn missing_key_is_not_found_and_nothing_changes() {
    let testnet = Testnet::builder(PEERS).seed(1).build().unwrap();
    let before = snapshot(&testnet);

    let target = Id::hash(b"never stored");
    for &address in testnet.addresses.iter().step_by(7) {
        assert_eq!(testnet.dht.get(address, target), Err(Error::NotFound));
    }

    assert_eq!(snapshot(&testnet), before);
}

#[test]
fn degenerate_key_leaves_table_unchanged() {
    let mut testnet = Testnet::builder(PEERS).seed(2).build().unwrap();
    let before = snapshot(&testnet);

    let peer = testnet.addresses[5];
    assert_eq!(
        testnet.dht.put(peer, b"peer-5", b"value"),
        Err(Error::DegenerateKey)
    );

    assert_eq!(snapshot(&testnet), before);
    assert_eq!(testnet.dht.peer(peer).unwrap().values_len(), 0);
}

#[test]
fn key_hashing_to_another_peer_is_rejected() {
    let mut testnet = Testnet::builder(PEERS).seed(0).build().unwrap();
    let before = snapshot(&testnet);
    let target = Id::hash(b"peer-7");

    assert_eq!(
        testnet.dht.put(testnet.addresses[5], b"peer-7", b"value"),
        Err(Error::DegenerateKey)
    );

    assert_eq!(snapshot(&testnet), before);
    assert!(testnet.dht.peers().iter().all(|peer| peer.values_len() == 0));
    assert_eq!(
        testnet.dht.get(testnet.addresses[9], target),
        Err(Error::NotFound)
    );
}

#[test]
fn find_node_returns_k_sorted() {
    let testnet = Testnet::builder(PEERS).seed(4).build().unwrap();
    let k = testnet.dht.config().k;
    let target = Id::hash(b"some target");

    for &address in &testnet.addresses {
        let closest = testnet.dht.find_node(address, target).unwrap();

        assert_eq!(closest.len(), k);

        let distances: Vec<Id> = closest.iter().map(|n| n.id().xor(&target)).collect();
        let mut sorted = distances.clone();
        sorted.sort();
        assert_eq!(distances, sorted);

        // Same selection as scanning the whole routing table.
        let mut all: Vec<Id> = testnet
            .dht
            .peer(address)
            .unwrap()
            .routing_table()
            .nodes()
            .map(|n| n.id().xor(&target))
            .collect();
        all.sort();
        assert_eq!(distances, &all[..k]);
    }
}

#[test]
fn many_keys_through_random_peers() {
    let mut testnet = Testnet::builder(PEERS).seed(5).build().unwrap();
    let mut rng = StdRng::seed_from_u64(5);

    let mut stored = vec![];

    for i in 0..20 {
        let key = format!("key-{i}");
        let value: Vec<u8> = (0..rng.gen_range(0..64)).map(|_| rng.gen()).collect();
        let origin = *testnet.addresses.choose(&mut rng).unwrap();

        match testnet.dht.put(origin, key.as_bytes(), &value) {
            Ok(owner) => {
                assert_eq!(Some(owner), testnet.closest_peer(&Id::hash(&key), 0));
                stored.push((Id::hash(&key), value));
            }
            // Three items already share the owner's bucket.
            Err(Error::BucketFull { .. }) => {}
            Err(error) => panic!("unexpected error {error}"),
        }
    }

    assert!(stored.len() >= 15);

    for (target, value) in stored {
        let from: PeerAddr = *testnet.addresses.choose(&mut rng).unwrap();
        let item = testnet.dht.get(from, target).unwrap();

        assert!(item.verify(&target));
        assert_eq!(item.value, value);
    }
}

#[test]
fn immutable_round_trip() {
    let mut testnet = Testnet::new(64).unwrap();
    let value = b"Hello, world!";

    let target = testnet.dht.put_immutable(testnet.addresses[3], value).unwrap();
    assert_eq!(target, Id::hash(value));

    let got = testnet
        .dht
        .get_immutable(testnet.addresses[40], target)
        .unwrap();

    assert_eq!(&got[..], value);
    assert_eq!(Id::hash(&got), target);
}
