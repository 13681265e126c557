use bigdecimal::BigDecimal;
use num_traits::Zero;
use once_cell::sync::Lazy;

use super::PricingConfig;
use crate::db::{EntityStore, Pair, Token};

static TWO: Lazy<BigDecimal> = Lazy::new(|| BigDecimal::from(2));

/// USD attribution of trades and pool balances under whitelist rules.
///
/// Only whitelisted tokens are trusted as price sources. A side whose token
/// is not whitelisted is ignored (volume) or mirrored from the trusted side
/// (liquidity), and nothing is tracked when neither side is whitelisted.
pub struct TrackedValuator<'a> {
    config: &'a PricingConfig,
    native_price_usd: BigDecimal,
}

impl<'a> TrackedValuator<'a> {
    pub fn new(config: &'a PricingConfig, native_price_usd: BigDecimal) -> Self {
        Self {
            config,
            native_price_usd,
        }
    }

    /// Valuator at the bundle's current native price (zero if no bundle yet).
    pub fn from_store<S>(config: &'a PricingConfig, store: &S) -> Self
    where
        S: EntityStore + ?Sized,
    {
        let native_price_usd = store
            .load_bundle()
            .map(|bundle| bundle.native_price)
            .unwrap_or_else(BigDecimal::zero);

        Self::new(config, native_price_usd)
    }

    pub fn native_price_usd(&self) -> &BigDecimal {
        &self.native_price_usd
    }

    fn price_usd(&self, token: &Token) -> BigDecimal {
        &token.derived_native * &self.native_price_usd
    }

    /// USD volume of a swap to count towards aggregate statistics.
    ///
    /// Pairs with fewer than `minimum_liquidity_providers` LPs must hold at
    /// least `minimum_usd_threshold_new_pairs` of trusted reserve value, or
    /// the trade is not tracked. Then:
    /// - both whitelisted: mean of the two sides' USD values
    /// - one whitelisted: that side's USD value
    /// - neither: zero
    pub fn tracked_volume_usd(
        &self,
        amount0: &BigDecimal,
        token0: &Token,
        amount1: &BigDecimal,
        token1: &Token,
        pair: &Pair,
    ) -> BigDecimal {
        let price0 = self.price_usd(token0);
        let price1 = self.price_usd(token1);

        let whitelisted0 = self.config.is_whitelisted(&token0.address);
        let whitelisted1 = self.config.is_whitelisted(&token1.address);

        if pair.liquidity_provider_count < self.config.minimum_liquidity_providers {
            let reserve0_usd = &pair.reserve0 * &price0;
            let reserve1_usd = &pair.reserve1 * &price1;
            let threshold = &self.config.minimum_usd_threshold_new_pairs;

            let below_threshold = match (whitelisted0, whitelisted1) {
                (true, true) => &(reserve0_usd + reserve1_usd) < threshold,
                (true, false) => &(reserve0_usd * &*TWO) < threshold,
                (false, true) => &(reserve1_usd * &*TWO) < threshold,
                (false, false) => false,
            };

            if below_threshold {
                return BigDecimal::zero();
            }
        }

        match (whitelisted0, whitelisted1) {
            (true, true) => (amount0 * &price0 + amount1 * &price1) / &*TWO,
            (true, false) => amount0 * &price0,
            (false, true) => amount1 * &price1,
            (false, false) => BigDecimal::zero(),
        }
    }

    /// USD liquidity of pool balances, without any young-pair gating.
    ///
    /// - both whitelisted: sum of both sides
    /// - one whitelisted: twice that side (assumes a balanced 50/50 pool)
    /// - neither: zero
    pub fn tracked_liquidity_usd(
        &self,
        amount0: &BigDecimal,
        token0: &Token,
        amount1: &BigDecimal,
        token1: &Token,
    ) -> BigDecimal {
        let whitelisted0 = self.config.is_whitelisted(&token0.address);
        let whitelisted1 = self.config.is_whitelisted(&token1.address);

        match (whitelisted0, whitelisted1) {
            (true, true) => amount0 * self.price_usd(token0) + amount1 * self.price_usd(token1),
            (true, false) => amount0 * self.price_usd(token0) * &*TWO,
            (false, true) => amount1 * self.price_usd(token1) * &*TWO,
            (false, false) => BigDecimal::zero(),
        }
    }
}
