use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// Constant-product liquidity pair and its current state.
///
/// Primary Key: address (lowercase)
///
/// `token0`/`token1` are fixed by the factory at creation and never swapped.
/// Prices follow the V2 subgraph convention:
/// - `token0_price` = token0 per token1 = reserve0 / reserve1
/// - `token1_price` = token1 per token0 = reserve1 / reserve0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    // Primary key
    pub address: String,

    pub token0: String,
    pub token1: String,

    // Reserves (decimal adjusted)
    pub reserve0: BigDecimal,
    pub reserve1: BigDecimal,

    /// Total pooled value in native-asset units
    pub reserve_native: BigDecimal,
    pub reserve_usd: BigDecimal,
    /// Pooled value counted under whitelist rules, in native-asset units
    pub tracked_reserve_native: BigDecimal,

    pub token0_price: BigDecimal,
    pub token1_price: BigDecimal,

    // Lifetime stats
    pub volume_token0: BigDecimal,
    pub volume_token1: BigDecimal,
    pub volume_usd: BigDecimal,
    pub untracked_volume_usd: BigDecimal,
    pub tx_count: u64,

    pub liquidity_provider_count: u64,

    pub created_at_block: u64,
}

impl Pair {
    /// Fresh pair as emitted by `PairCreated`: empty reserves, no providers.
    pub fn new(address: String, token0: String, token1: String, created_at_block: u64) -> Self {
        Self {
            address: address.to_lowercase(),
            token0: token0.to_lowercase(),
            token1: token1.to_lowercase(),
            reserve0: BigDecimal::zero(),
            reserve1: BigDecimal::zero(),
            reserve_native: BigDecimal::zero(),
            reserve_usd: BigDecimal::zero(),
            tracked_reserve_native: BigDecimal::zero(),
            token0_price: BigDecimal::zero(),
            token1_price: BigDecimal::zero(),
            volume_token0: BigDecimal::zero(),
            volume_token1: BigDecimal::zero(),
            volume_usd: BigDecimal::zero(),
            untracked_volume_usd: BigDecimal::zero(),
            tx_count: 0,
            liquidity_provider_count: 0,
            created_at_block,
        }
    }
}
