//! Type conversion and formatting utilities.
//!
//! Raw on-chain amounts (U256) are converted to `BigDecimal` through
//! `BigInt` so large reserves never pass through a lossy float.

use alloy::primitives::{hex, Address, U256};
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use once_cell::sync::Lazy;

// ============================================
// Hex Encoding
// ============================================

/// Encode bytes as a lowercase hex string with 0x prefix.
pub fn hex_encode(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Lowercase 0x-prefixed form of an address, the key used by the store.
pub fn address_key(address: &Address) -> String {
    hex_encode(address.as_slice())
}

// ============================================
// U256 Conversions
// ============================================

/// Convert a U256 into a `BigInt` via its little-endian bytes.
pub fn u256_to_bigint(value: U256) -> BigInt {
    let bytes: [u8; 32] = value.to_le_bytes();
    BigInt::from_bytes_le(Sign::Plus, &bytes)
}

/// Scale a raw token amount down by the token's decimals.
///
/// # Example
/// ```ignore
/// let one = convert_token_to_decimal(U256::from(1_000_000u64), 6); // 1
/// ```
pub fn convert_token_to_decimal(value: U256, decimals: u8) -> BigDecimal {
    let big_value = BigDecimal::from(u256_to_bigint(value));

    if decimals == 0 {
        big_value
    } else {
        big_value / big_pow10(decimals)
    }
}

// ============================================
// Decimal Arithmetic
// ============================================

/// Significant digits kept for derived prices and accumulated values.
pub const DECIMAL_PRECISION: u64 = 34;

/// Round to [`DECIMAL_PRECISION`] significant digits.
///
/// Derived values feed back into each other across events (a token priced
/// through another whitelisted token that is priced through it), so
/// unrounded products would grow without limit.
pub fn round_precision(value: &BigDecimal) -> BigDecimal {
    // with_prec also pads shorter values with trailing zeros
    if value.digits() > DECIMAL_PRECISION {
        value.with_prec(DECIMAL_PRECISION)
    } else {
        value.clone()
    }
}

/// Divide, returning zero when the divisor is zero. The quotient is rounded
/// to [`DECIMAL_PRECISION`] significant digits.
pub fn safe_div(amount0: &BigDecimal, amount1: &BigDecimal) -> BigDecimal {
    if amount1.is_zero() {
        BigDecimal::zero()
    } else {
        round_precision(&(amount0 / amount1))
    }
}

// ============================================
// Internal Helpers
// ============================================

static POW10_CACHE: Lazy<[BigDecimal; 25]> =
    Lazy::new(|| std::array::from_fn(|i| BigDecimal::from(BigInt::from(10u32).pow(i as u32))));

/// Compute 10^exp as BigDecimal.
pub(crate) fn big_pow10(exp: u8) -> BigDecimal {
    if (exp as usize) < POW10_CACHE.len() {
        POW10_CACHE[exp as usize].clone()
    } else {
        BigDecimal::from(BigInt::from(10u32).pow(exp as u32))
    }
}
