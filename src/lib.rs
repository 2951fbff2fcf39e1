#![doc = include_str!("../README.md")]

// Public modules
mod common;

mod dht;
mod error;
pub mod rpc;

pub use crate::common::{
    ClosestNodes, Id, Item, KBucket, Node, PeerAddr, RoutingTable, DEFAULT_K, ID_BITS, ID_SIZE,
};
pub use bytes::Bytes;
pub use dht::{Dht, Testnet, TestnetBuilder};
pub use error::{Error, Result};
pub use rpc::{Config, Peer};
