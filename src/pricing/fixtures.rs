//! Shared builders for pricing tests.

use std::str::FromStr;

use bigdecimal::BigDecimal;

use super::{Anchor, PricingConfig, Whitelist};
use crate::db::{Pair, Token};

pub const NATIVE: &str = "0x00000000000000000000000000000000000000aa";
pub const STABLE_A: &str = "0x00000000000000000000000000000000000000a1";
pub const STABLE_B: &str = "0x00000000000000000000000000000000000000b1";
pub const ANCHOR: &str = "0x00000000000000000000000000000000000000c1";
pub const TOKEN_X: &str = "0x00000000000000000000000000000000000000f1";
pub const TOKEN_Y: &str = "0x00000000000000000000000000000000000000f2";

/// Whitelist order: ANCHOR, NATIVE, STABLE_B, STABLE_A.
pub fn config() -> PricingConfig {
    PricingConfig {
        native_token: NATIVE.to_string(),
        whitelist: Whitelist::new([ANCHOR, NATIVE, STABLE_B, STABLE_A]),
        primary_anchor: Anchor {
            pair: "0x00000000000000000000000000000000000001a1".to_string(),
            stablecoin: STABLE_A.to_string(),
        },
        secondary_anchor: Anchor {
            pair: "0x00000000000000000000000000000000000001b1".to_string(),
            stablecoin: STABLE_B.to_string(),
        },
        minimum_liquidity_threshold_native: BigDecimal::from(5),
        minimum_usd_threshold_new_pairs: BigDecimal::from(3000),
        minimum_liquidity_providers: 5,
    }
}

pub fn dec(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

pub fn pair(address: &str, token0: &str, token1: &str) -> Pair {
    Pair::new(address.to_string(), token0.to_string(), token1.to_string(), 0)
}

pub fn token(address: &str, derived_native: &str) -> Token {
    let mut token = Token::new(address.to_string(), String::new(), String::new(), 18);
    token.derived_native = dec(derived_native);
    token
}
