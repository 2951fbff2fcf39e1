//! Key/value items held by the peer responsible for them.

use bytes::Bytes;

use crate::common::Id;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A stored key/value pair. Its target is the hash of `key`.
pub struct Item {
    pub key: Bytes,
    pub value: Bytes,
}

impl Item {
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Item {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Item whose key is its own value, so the value itself hashes to the target.
    pub fn immutable(value: impl Into<Bytes>) -> Self {
        let value = value.into();

        Item {
            key: value.clone(),
            value,
        }
    }

    /// The Id this item is stored under.
    pub fn target(&self) -> Id {
        Id::hash(&self.key)
    }

    /// Returns true if this item hashes to `target`.
    pub fn verify(&self, target: &Id) -> bool {
        &self.target() == target
    }
}
