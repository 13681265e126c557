//! Utility functions for the Prism indexer.
//!
//! - [`conversion`] - Raw amount to decimal conversions and hex formatting

mod conversion;

// ============================================
// Common Constants
// ============================================

/// The Ethereum zero address (0x0000000000000000000000000000000000000000)
/// Returned by pair lookups when no pair exists, and the sender of LP mints.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

// ============================================
// Re-exports
// ============================================

pub use conversion::{
    address_key, convert_token_to_decimal, hex_encode, round_precision, safe_div,
    u256_to_bigint, DECIMAL_PRECISION,
};
