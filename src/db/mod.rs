//! Entity storage.
//!
//! The valuation core reads and writes entities only through [`EntityStore`],
//! keyed by lowercase address. Loads return `Option`: a missing pair or
//! bundle is a normal state early in indexing and callers decide the fallback.

mod memory;
pub mod models;

pub use memory::MemoryStore;
pub use models::{Bundle, Pair, Token, BUNDLE_ID};

/// Keyed load/save access to indexed entities.
pub trait EntityStore {
    fn load_token(&self, address: &str) -> Option<Token>;
    fn save_token(&mut self, token: Token);

    fn load_pair(&self, address: &str) -> Option<Pair>;
    fn save_pair(&mut self, pair: Pair);

    fn load_bundle(&self) -> Option<Bundle>;
    fn save_bundle(&mut self, bundle: Bundle);

    /// Record that `provider` holds LP tokens of `pair`.
    /// Returns true if the position did not exist before.
    fn save_liquidity_position(&mut self, pair: &str, provider: &str) -> bool;
}
