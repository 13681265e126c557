use rustc_hash::FxHashMap;

use crate::{db::Pair, pricing::PairLookup};

/// Index of deployed pairs by their (unordered) token addresses.
///
/// Filled from the factory's `PairCreated` events, so it answers the same
/// question as the factory's `getPair(tokenA, tokenB)` for every pair the
/// indexer has seen, without an RPC round trip.
#[derive(Debug, Default, Clone)]
pub struct PairDirectory {
    pairs: FxHashMap<(String, String), String>,
}

impl PairDirectory {
    /// Rebuild from pairs already in the store (e.g. after loading a snapshot).
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = &'a Pair>) -> Self {
        let mut directory = Self::default();
        for pair in pairs {
            directory.register(&pair.token0, &pair.token1, &pair.address);
        }
        directory
    }

    pub fn register(&mut self, token_a: &str, token_b: &str, pair: &str) {
        self.pairs.insert(Self::key(token_a, token_b), pair.to_lowercase());
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn key(token_a: &str, token_b: &str) -> (String, String) {
        let a = token_a.to_lowercase();
        let b = token_b.to_lowercase();
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl PairLookup for PairDirectory {
    fn get_pair(&self, token_a: &str, token_b: &str) -> Option<String> {
        self.pairs.get(&Self::key(token_a, token_b)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_argument_order() {
        let mut directory = PairDirectory::default();
        directory.register("0xbbbb", "0xAAAA", "0xPAIR");

        assert_eq!(directory.get_pair("0xaaaa", "0xbbbb"), Some("0xpair".to_string()));
        assert_eq!(directory.get_pair("0xbbbb", "0xaaaa"), Some("0xpair".to_string()));
        assert_eq!(directory.get_pair("0xaaaa", "0xcccc"), None);
    }

    #[test]
    fn test_rebuild_from_stored_pairs() {
        let pairs = [
            Pair::new("0xp1".to_string(), "0xa".to_string(), "0xb".to_string(), 1),
            Pair::new("0xp2".to_string(), "0xb".to_string(), "0xc".to_string(), 2),
        ];
        let directory = PairDirectory::from_pairs(pairs.iter());

        assert_eq!(directory.len(), 2);
        assert_eq!(directory.get_pair("0xc", "0xb"), Some("0xp2".to_string()));
    }
}
