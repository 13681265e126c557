use std::sync::Arc;

use alloy::primitives::U256;
use anyhow::{Context, Result};
use bigdecimal::BigDecimal;
use log::debug;
use num_traits::Zero;

use crate::{
    db::{Bundle, EntityStore, Pair, Token},
    pricing::{find_native_per_token, get_native_price_in_usd, PricingConfig, TrackedValuator},
    utils::{address_key, convert_token_to_decimal, round_precision, safe_div, ZERO_ADDRESS},
    worker::{ParsedLog, PairDirectory},
};

/// Applies V2 factory/pair events to the store and keeps derived prices current.
///
/// Handlers run synchronously and must see logs in chain order: every
/// reserve change refreshes the bundle before token prices, and token prices
/// before tracked liquidity, so later swaps read up-to-date valuations.
pub struct EventProcessor<S: EntityStore> {
    config: Arc<PricingConfig>,
    store: S,
    directory: PairDirectory,
}

impl<S: EntityStore> EventProcessor<S> {
    pub fn new(config: Arc<PricingConfig>, store: S, directory: PairDirectory) -> Self {
        Self {
            config,
            store,
            directory,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn directory(&self) -> &PairDirectory {
        &self.directory
    }

    /// Store newly fetched token metadata. Existing tokens are left untouched.
    pub fn insert_tokens(&mut self, tokens: impl IntoIterator<Item = Token>) {
        for token in tokens {
            if self.store.load_token(&token.address).is_none() {
                self.store.save_token(token);
            }
        }
    }

    /// Process one parsed log.
    pub fn process(&mut self, log: &ParsedLog) -> Result<()> {
        match log {
            ParsedLog::PairCreated {
                event,
                block_number,
                ..
            } => {
                self.handle_pair_created(
                    &address_key(&event.token0),
                    &address_key(&event.token1),
                    &address_key(&event.pair),
                    *block_number,
                );
                Ok(())
            },
            ParsedLog::Transfer { event, pair, .. } => {
                self.handle_lp_mint(pair, &address_key(&event.from), &address_key(&event.to));
                Ok(())
            },
            ParsedLog::Sync {
                event,
                pair,
                block_number,
                ..
            } => {
                let reserve0: u128 = event.reserve0.to();
                let reserve1: u128 = event.reserve1.to();
                self.handle_sync(pair, U256::from(reserve0), U256::from(reserve1))
                    .with_context(|| format!("Sync on {pair} at block {block_number}"))
            },
            ParsedLog::Swap {
                event,
                pair,
                tx_hash,
                ..
            } => self
                .handle_swap(
                    pair,
                    event.amount0In,
                    event.amount1In,
                    event.amount0Out,
                    event.amount1Out,
                )
                .with_context(|| format!("Swap on {pair} in tx {tx_hash}")),
        }
    }

    /// Register a pair emitted by the factory.
    ///
    /// Returns false when the pair is skipped: it already exists, or one of
    /// its tokens has no metadata (pairs must never reference missing tokens).
    pub fn handle_pair_created(
        &mut self,
        token0: &str,
        token1: &str,
        pair: &str,
        block_number: u64,
    ) -> bool {
        if self.store.load_pair(pair).is_some() {
            return false;
        }

        for token in [token0, token1] {
            if self.store.load_token(token).is_none() {
                debug!("Skipping pair {}: token {} unavailable", pair, token);
                return false;
            }
        }

        let pair = Pair::new(
            pair.to_string(),
            token0.to_string(),
            token1.to_string(),
            block_number,
        );
        self.directory
            .register(&pair.token0, &pair.token1, &pair.address);
        debug!("New pair {} ({} / {})", pair.address, pair.token0, pair.token1);
        self.store.save_pair(pair);

        true
    }

    /// Count a new liquidity provider the first time an address receives
    /// freshly minted LP tokens of a known pair.
    pub fn handle_lp_mint(&mut self, pair_address: &str, from: &str, to: &str) {
        if from != ZERO_ADDRESS || to == ZERO_ADDRESS || to == pair_address {
            return;
        }

        let Some(mut pair) = self.store.load_pair(pair_address) else {
            return;
        };

        if self.store.save_liquidity_position(pair_address, to) {
            pair.liquidity_provider_count += 1;
            self.store.save_pair(pair);
        }
    }

    /// Apply new reserves and refresh every price that depends on them.
    pub fn handle_sync(&mut self, pair_address: &str, reserve0: U256, reserve1: U256) -> Result<()> {
        let Some(mut pair) = self.store.load_pair(pair_address) else {
            return Ok(());
        };
        let mut token0 = self.load_token(&pair.token0, pair_address)?;
        let mut token1 = self.load_token(&pair.token1, pair_address)?;

        // Remove the old reserves from token totals before overwriting them
        token0.total_liquidity -= &pair.reserve0;
        token1.total_liquidity -= &pair.reserve1;

        pair.reserve0 = convert_token_to_decimal(reserve0, token0.decimals);
        pair.reserve1 = convert_token_to_decimal(reserve1, token1.decimals);
        pair.token0_price = safe_div(&pair.reserve0, &pair.reserve1);
        pair.token1_price = safe_div(&pair.reserve1, &pair.reserve0);
        self.store.save_pair(pair.clone());

        // Anchor pairs are ordinary pairs, so the bundle may have just moved
        let native_price = get_native_price_in_usd(&self.store, &self.config);
        self.store.save_bundle(Bundle {
            native_price: native_price.clone(),
            ..Default::default()
        });

        // token1's search may read token0, so persist token0 first
        token0.derived_native =
            find_native_per_token(&token0.address, &self.store, &self.directory, &self.config)?;
        self.store.save_token(token0.clone());
        token1.derived_native =
            find_native_per_token(&token1.address, &self.store, &self.directory, &self.config)?;
        self.store.save_token(token1.clone());

        let valuator = TrackedValuator::new(&self.config, native_price.clone());
        let tracked_liquidity_usd =
            valuator.tracked_liquidity_usd(&pair.reserve0, &token0, &pair.reserve1, &token1);
        pair.tracked_reserve_native = safe_div(&tracked_liquidity_usd, &native_price);

        pair.reserve_native = round_precision(
            &(&pair.reserve0 * &token0.derived_native + &pair.reserve1 * &token1.derived_native),
        );
        pair.reserve_usd = round_precision(&(&pair.reserve_native * &native_price));

        token0.total_liquidity += &pair.reserve0;
        token1.total_liquidity += &pair.reserve1;

        self.store.save_pair(pair);
        self.store.save_token(token0);
        self.store.save_token(token1);

        Ok(())
    }

    /// Accumulate volumes of a swap, tracked and untracked.
    pub fn handle_swap(
        &mut self,
        pair_address: &str,
        amount0_in: U256,
        amount1_in: U256,
        amount0_out: U256,
        amount1_out: U256,
    ) -> Result<()> {
        let Some(mut pair) = self.store.load_pair(pair_address) else {
            return Ok(());
        };
        let mut token0 = self.load_token(&pair.token0, pair_address)?;
        let mut token1 = self.load_token(&pair.token1, pair_address)?;

        let amount0_total = convert_token_to_decimal(amount0_in, token0.decimals)
            + convert_token_to_decimal(amount0_out, token0.decimals);
        let amount1_total = convert_token_to_decimal(amount1_in, token1.decimals)
            + convert_token_to_decimal(amount1_out, token1.decimals);

        let valuator = TrackedValuator::from_store(&self.config, &self.store);

        // Untracked: both sides at derived prices, averaged
        let derived_amount_native = (&amount1_total * &token1.derived_native
            + &amount0_total * &token0.derived_native)
            / BigDecimal::from(2);
        let derived_amount_usd =
            round_precision(&(&derived_amount_native * valuator.native_price_usd()));

        let tracked_amount_usd = round_precision(&valuator.tracked_volume_usd(
            &amount0_total,
            &token0,
            &amount1_total,
            &token1,
            &pair,
        ));

        token0.trade_volume += &amount0_total;
        token0.trade_volume_usd = round_precision(&(&token0.trade_volume_usd + &tracked_amount_usd));
        token0.untracked_volume_usd =
            round_precision(&(&token0.untracked_volume_usd + &derived_amount_usd));
        token0.tx_count += 1;

        token1.trade_volume += &amount1_total;
        token1.trade_volume_usd = round_precision(&(&token1.trade_volume_usd + &tracked_amount_usd));
        token1.untracked_volume_usd =
            round_precision(&(&token1.untracked_volume_usd + &derived_amount_usd));
        token1.tx_count += 1;

        pair.volume_token0 += &amount0_total;
        pair.volume_token1 += &amount1_total;
        pair.volume_usd = round_precision(&(&pair.volume_usd + &tracked_amount_usd));
        pair.untracked_volume_usd =
            round_precision(&(&pair.untracked_volume_usd + &derived_amount_usd));
        pair.tx_count += 1;

        if tracked_amount_usd.is_zero() && !derived_amount_usd.is_zero() {
            debug!("Swap on {} not tracked ({} USD untracked)", pair_address, derived_amount_usd);
        }

        self.store.save_pair(pair);
        self.store.save_token(token0);
        self.store.save_token(token1);

        Ok(())
    }

    fn load_token(&self, token: &str, pair_address: &str) -> Result<Token> {
        self.store
            .load_token(token)
            .with_context(|| format!("Token {token} of pair {pair_address} not in store"))
    }
}

impl<S: EntityStore + Clone> EventProcessor<S> {
    /// Process logs as one unit: on error the store and directory are
    /// restored to their state before the first log, so a failed chunk
    /// never leaves half of its volumes applied.
    pub fn process_batch(&mut self, logs: &[ParsedLog]) -> Result<()> {
        let store = self.store.clone();
        let directory = self.directory.clone();

        for log in logs {
            if let Err(e) = self.process(log) {
                self.store = store;
                self.directory = directory;
                return Err(e);
            }
        }

        Ok(())
    }
}
