use std::{fs, path::Path};

use anyhow::Context;
use log::info;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::{
    models::{Bundle, Pair, Token},
    EntityStore,
};

/// In-memory entity store, persisted as a JSON snapshot between runs.
///
/// `last_block` is the last fully processed block; a resumed run starts
/// right after it.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoryStore {
    pub last_block: Option<u64>,
    tokens: FxHashMap<String, Token>,
    pairs: FxHashMap<String, Pair>,
    bundle: Option<Bundle>,
    /// pair address -> provider addresses
    liquidity_positions: FxHashMap<String, FxHashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot, or start empty if none exists at `path`.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No snapshot at {}, starting from an empty store", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let store: MemoryStore = serde_json::from_slice(&raw)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

        info!(
            "Loaded snapshot {} ({} tokens, {} pairs, last block {:?})",
            path.display(),
            store.tokens.len(),
            store.pairs.len(),
            store.last_block
        );

        Ok(store)
    }

    /// Write the snapshot atomically (temp file + rename).
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let tmp = path.with_extension("json.tmp");

        let raw = serde_json::to_vec(self).context("Failed to serialize snapshot")?;
        fs::write(&tmp, raw).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to move snapshot into {}", path.display()))?;

        Ok(())
    }

    pub fn contains_token(&self, address: &str) -> bool {
        self.tokens.contains_key(address)
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.values()
    }
}

impl EntityStore for MemoryStore {
    fn load_token(&self, address: &str) -> Option<Token> {
        self.tokens.get(address).cloned()
    }

    fn save_token(&mut self, token: Token) {
        self.tokens.insert(token.address.clone(), token);
    }

    fn load_pair(&self, address: &str) -> Option<Pair> {
        self.pairs.get(address).cloned()
    }

    fn save_pair(&mut self, pair: Pair) {
        self.pairs.insert(pair.address.clone(), pair);
    }

    fn load_bundle(&self) -> Option<Bundle> {
        self.bundle.clone()
    }

    fn save_bundle(&mut self, bundle: Bundle) {
        self.bundle = Some(bundle);
    }

    fn save_liquidity_position(&mut self, pair: &str, provider: &str) -> bool {
        self.liquidity_positions
            .entry(pair.to_string())
            .or_default()
            .insert(provider.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    #[test]
    fn test_liquidity_position_is_recorded_once() {
        let mut store = MemoryStore::new();
        assert!(store.save_liquidity_position("0xpair", "0xalice"));
        assert!(!store.save_liquidity_position("0xpair", "0xalice"));
        assert!(store.save_liquidity_position("0xpair", "0xbob"));
        assert!(store.save_liquidity_position("0xother", "0xalice"));
    }

    #[test]
    fn test_snapshot_round_trip_preserves_decimals() {
        let mut store = MemoryStore::new();
        let mut token = Token::new("0xAAAA".to_string(), "AAA".to_string(), "A".to_string(), 18);
        token.derived_native = BigDecimal::from_str("0.000000000123456789123456789").unwrap();
        store.save_token(token.clone());
        store.save_pair(Pair::new(
            "0xpair".to_string(),
            "0xaaaa".to_string(),
            "0xbbbb".to_string(),
            42,
        ));
        store.save_bundle(Bundle {
            native_price: BigDecimal::from_str("0.00033").unwrap(),
            ..Default::default()
        });
        store.save_liquidity_position("0xpair", "0xalice");
        store.last_block = Some(42);

        let path = std::env::temp_dir().join(format!("prism-snapshot-{}.json", std::process::id()));
        store.save(&path).unwrap();
        let loaded = MemoryStore::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.last_block, Some(42));
        assert_eq!(loaded.load_token("0xaaaa"), Some(token));
        assert_eq!(loaded.load_pair("0xpair").map(|p| p.created_at_block), Some(42));
        assert_eq!(
            loaded.load_bundle().map(|b| b.native_price),
            Some(BigDecimal::from_str("0.00033").unwrap())
        );
        let mut loaded = loaded;
        assert!(!loaded.save_liquidity_position("0xpair", "0xalice"));
    }

    #[test]
    fn test_load_missing_snapshot_is_empty() {
        let path = std::env::temp_dir().join("prism-snapshot-does-not-exist.json");
        let store = MemoryStore::load(&path).unwrap();
        assert_eq!(store.token_count(), 0);
        assert_eq!(store.last_block, None);
    }
}
