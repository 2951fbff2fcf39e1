use std::num::NonZeroUsize;

use crate::common::DEFAULT_K;

use super::{DEFAULT_MAX_HOPS, DEFAULT_MAX_VALUES};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Dht Configurations
pub struct Config {
    /// Maximum number of contacts in each k-bucket, also the number of
    /// closest nodes returned by `find_node` and tried at every hop.
    ///
    /// Defaults to [DEFAULT_K]
    pub k: usize,
    /// Maximum number of times a `put` or `get` request is forwarded
    /// before the walk gives up on that path.
    ///
    /// Defaults to [DEFAULT_MAX_HOPS]
    pub max_hops: u8,
    /// Maximum number of items each peer keeps in its value store,
    /// the least recently stored is dropped first.
    ///
    /// Defaults to [DEFAULT_MAX_VALUES]
    pub max_values: NonZeroUsize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            max_hops: DEFAULT_MAX_HOPS,
            max_values: DEFAULT_MAX_VALUES,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.k, 3);
        assert_eq!(config.max_hops, 160);
        assert_eq!(config.max_values.get(), 1000);
    }
}
