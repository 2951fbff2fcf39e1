//! Stores random values through random peers of a seeded testnet, then looks
//! random keys up through other random peers.
//!
//! Run: `cargo run --example simulate -- --peers 160 --keys 200 --lookups 100`

use clap::Parser;
use kademlia_sim::{Error, Id, Testnet};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of peers in the testnet
    #[arg(long, default_value_t = 160)]
    peers: usize,
    /// Number of keys to store
    #[arg(long, default_value_t = 200)]
    keys: usize,
    /// Number of random lookups
    #[arg(long, default_value_t = 100)]
    lookups: usize,
    /// Seed for the topology and the workload
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Log every hop
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            Level::TRACE
        } else {
            Level::INFO
        })
        .init();

    let mut testnet = Testnet::builder(cli.peers).seed(cli.seed).build()?;
    let mut rng = StdRng::seed_from_u64(cli.seed);

    let mut stored = 0;
    for i in 0..cli.keys {
        let key = format!("key-{i}");
        let value: Vec<u8> = (0..rng.gen_range(0..1024)).map(|_| rng.gen()).collect();

        let Some(&origin) = testnet.addresses.choose(&mut rng) else {
            break;
        };

        match testnet.dht.put(origin, key.as_bytes(), &value) {
            Ok(owner) => {
                stored += 1;
                info!(%origin, %owner, target = %Id::hash(&key), "Stored");
            }
            Err(error) => warn!(%origin, ?error, %key, "Store failed"),
        }
    }

    let mut found = 0;
    for _ in 0..cli.lookups {
        let target = Id::hash(format!("key-{}", rng.gen_range(0..cli.keys.max(1))));

        let Some(&from) = testnet.addresses.choose(&mut rng) else {
            break;
        };

        match testnet.dht.get(from, target) {
            Ok(item) => {
                found += 1;
                info!(%from, %target, size = item.value.len(), "Found");
            }
            Err(error) => warn!(%from, %target, ?error, "Lookup failed"),
        }
    }

    info!(
        stored,
        keys = cli.keys,
        found,
        lookups = cli.lookups,
        "Simulation done"
    );

    Ok(())
}
