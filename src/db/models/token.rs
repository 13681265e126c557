use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// ERC-20 token traded on the exchange.
///
/// Primary Key: address (lowercase)
/// Created by the indexer the first time a pair referencing it is seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    // Primary key
    pub address: String,

    // On-chain metadata (immutable after first fetch)
    pub symbol: String,
    pub name: String,
    pub decimals: u8,

    /// Price of one unit in native-asset terms, rewritten on every reserve change
    pub derived_native: BigDecimal,

    // Lifetime stats
    pub trade_volume: BigDecimal,
    pub trade_volume_usd: BigDecimal,
    pub untracked_volume_usd: BigDecimal,
    pub total_liquidity: BigDecimal,
    pub tx_count: u64,
}

impl Token {
    /// Constructor for just metadata (used by TokenFetcher)
    pub fn new(address: String, symbol: String, name: String, decimals: u8) -> Self {
        Self {
            // Always lowercase addresses for consistent comparisons
            address: address.to_lowercase(),
            symbol,
            name,
            decimals,
            derived_native: BigDecimal::zero(),
            trade_volume: BigDecimal::zero(),
            trade_volume_usd: BigDecimal::zero(),
            untracked_volume_usd: BigDecimal::zero(),
            total_liquidity: BigDecimal::zero(),
            tx_count: 0,
        }
    }
}
