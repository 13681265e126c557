//! Valuation engine.
//!
//! Four pure functions of store state, run by the worker in dependency order:
//!
//! 1. [`get_native_price_in_usd`] - native asset USD price from the anchor pairs
//! 2. [`find_native_per_token`] - token price in native units via the whitelist
//! 3. [`TrackedValuator::tracked_volume_usd`] - trusted USD volume of a swap
//! 4. [`TrackedValuator::tracked_liquidity_usd`] - trusted USD value of reserves
//!
//! (3) and (4) read prices written by (1) and (2), so those must be persisted
//! first. Every "cannot price yet" outcome is a zero result, never an error.

mod derived_price;
mod native_price;
mod pricing_config;
mod tracked;

#[cfg(test)]
pub(crate) mod fixtures;

pub use derived_price::{find_native_per_token, PairLookup};
pub use native_price::get_native_price_in_usd;
pub use pricing_config::{Anchor, PricingConfig, Whitelist};
pub use tracked::TrackedValuator;
