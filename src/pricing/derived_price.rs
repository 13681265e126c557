use anyhow::Context;
use bigdecimal::BigDecimal;
use num_traits::{One, Zero};

use super::PricingConfig;
use crate::{
    db::EntityStore,
    utils::{round_precision, ZERO_ADDRESS},
};

/// Resolves the pair contract deployed for two tokens.
///
/// Mirrors the factory's `getPair` view: argument order does not matter and
/// an absent pair is `None` (or the zero address).
pub trait PairLookup {
    fn get_pair(&self, token_a: &str, token_b: &str) -> Option<String>;
}

/// Price of one unit of `token` in native-asset units.
///
/// Walks the whitelist in order and prices the token through the first pair
/// with a whitelisted counter-token whose `reserve_native` is strictly above
/// the minimum liquidity threshold:
///
/// ```text
/// derived = (counter-token per token) * counter.derived_native
/// ```
///
/// Thin pairs are skipped even if they are the only path, so a token can
/// stay at zero until liquidity grows. The wrapped native token is always 1.
///
/// Errors only if the lookup returns a pair whose Pair or counter-token
/// record is missing from the store.
pub fn find_native_per_token<S, L>(
    token: &str,
    store: &S,
    pairs: &L,
    config: &PricingConfig,
) -> anyhow::Result<BigDecimal>
where
    S: EntityStore + ?Sized,
    L: PairLookup + ?Sized,
{
    if config.is_native(token) {
        return Ok(BigDecimal::one());
    }

    for candidate in config.whitelist.iter() {
        let Some(pair_address) = pairs.get_pair(token, candidate) else {
            continue;
        };
        if pair_address == ZERO_ADDRESS {
            continue;
        }

        let pair = store
            .load_pair(&pair_address)
            .with_context(|| format!("Pair {pair_address} for {token}/{candidate} not in store"))?;

        if pair.reserve_native <= config.minimum_liquidity_threshold_native {
            continue;
        }

        // token1_price = token1 per token0, token0_price = token0 per token1
        let (counter_address, price_in_counter) = if pair.token0 == token {
            (&pair.token1, &pair.token1_price)
        } else if pair.token1 == token {
            (&pair.token0, &pair.token0_price)
        } else {
            continue;
        };

        let counter = store.load_token(counter_address).with_context(|| {
            format!("Token {counter_address} of pair {pair_address} not in store")
        })?;

        return Ok(round_precision(&(price_in_counter * &counter.derived_native)));
    }

    Ok(BigDecimal::zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::pricing::fixtures::{
        config, dec, pair, token, ANCHOR, NATIVE, STABLE_A, STABLE_B, TOKEN_X,
    };
    use crate::worker::PairDirectory;

    const X_NATIVE: &str = "0x0000000000000000000000000000000000000101";
    const X_ANCHOR: &str = "0x0000000000000000000000000000000000000102";
    const X_STABLE: &str = "0x0000000000000000000000000000000000000103";

    fn base_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.save_token(token(NATIVE, "1"));
        store.save_token(token(ANCHOR, "0.2"));
        store.save_token(token(STABLE_A, "0.0004"));
        store.save_token(token(STABLE_B, "0.0004"));
        store.save_token(token(TOKEN_X, "0"));
        store
    }

    #[test]
    fn test_native_token_is_always_one() {
        let config = config();
        let empty = MemoryStore::new();
        let directory = PairDirectory::default();
        assert_eq!(
            find_native_per_token(NATIVE, &empty, &directory, &config).unwrap(),
            BigDecimal::one()
        );

        // Even with a liquid pair that would price it differently
        let mut store = base_store();
        let mut directory = PairDirectory::default();
        let mut p = pair(X_ANCHOR, NATIVE, ANCHOR);
        p.reserve_native = dec("1000");
        p.token1_price = dec("7");
        store.save_pair(p);
        directory.register(NATIVE, ANCHOR, X_ANCHOR);
        assert_eq!(
            find_native_per_token(NATIVE, &store, &directory, &config).unwrap(),
            BigDecimal::one()
        );
    }

    #[test]
    fn test_no_whitelist_pair_returns_zero() {
        let config = config();
        let store = base_store();
        let directory = PairDirectory::default();
        assert_eq!(
            find_native_per_token(TOKEN_X, &store, &directory, &config).unwrap(),
            BigDecimal::zero()
        );
    }

    #[test]
    fn test_token0_side_uses_token1_price() {
        let config = config();
        let mut store = base_store();
        let mut directory = PairDirectory::default();

        // X is token0, 1 X = 40 NATIVE
        let mut p = pair(X_NATIVE, TOKEN_X, NATIVE);
        p.reserve_native = dec("10");
        p.token0_price = dec("0.025");
        p.token1_price = dec("40");
        store.save_pair(p);
        directory.register(TOKEN_X, NATIVE, X_NATIVE);

        assert_eq!(
            find_native_per_token(TOKEN_X, &store, &directory, &config).unwrap(),
            dec("40")
        );
    }

    #[test]
    fn test_token1_side_uses_token0_price_times_counter_derived() {
        let config = config();
        let mut store = base_store();
        let mut directory = PairDirectory::default();

        // X is token1, 1 X = 3 STABLE_A, STABLE_A = 0.0004 native
        let mut p = pair(X_STABLE, STABLE_A, TOKEN_X);
        p.reserve_native = dec("6");
        p.token0_price = dec("3");
        p.token1_price = dec("0.333");
        store.save_pair(p);
        directory.register(STABLE_A, TOKEN_X, X_STABLE);

        assert_eq!(
            find_native_per_token(TOKEN_X, &store, &directory, &config).unwrap(),
            dec("0.0012")
        );
    }

    #[test]
    fn test_reserve_exactly_at_threshold_does_not_qualify() {
        let config = config();
        let mut store = base_store();
        let mut directory = PairDirectory::default();

        let mut p = pair(X_NATIVE, TOKEN_X, NATIVE);
        p.reserve_native = dec("5");
        p.token1_price = dec("40");
        store.save_pair(p);
        directory.register(TOKEN_X, NATIVE, X_NATIVE);

        assert_eq!(
            find_native_per_token(TOKEN_X, &store, &directory, &config).unwrap(),
            BigDecimal::zero()
        );

        let mut p = store.load_pair(X_NATIVE).unwrap();
        p.reserve_native = dec("5.000001");
        store.save_pair(p);
        assert_eq!(
            find_native_per_token(TOKEN_X, &store, &directory, &config).unwrap(),
            dec("40")
        );
    }

    #[test]
    fn test_thin_pair_is_skipped_for_next_whitelist_entry() {
        let config = config();
        let mut store = base_store();
        let mut directory = PairDirectory::default();

        // ANCHOR comes first in the whitelist but its pair is thin
        let mut thin = pair(X_ANCHOR, TOKEN_X, ANCHOR);
        thin.reserve_native = dec("1");
        thin.token1_price = dec("1000");
        store.save_pair(thin);
        directory.register(TOKEN_X, ANCHOR, X_ANCHOR);

        let mut deep = pair(X_NATIVE, NATIVE, TOKEN_X);
        deep.reserve_native = dec("500");
        deep.token0_price = dec("2");
        store.save_pair(deep);
        directory.register(NATIVE, TOKEN_X, X_NATIVE);

        assert_eq!(
            find_native_per_token(TOKEN_X, &store, &directory, &config).unwrap(),
            dec("2")
        );
    }

    #[test]
    fn test_first_qualifying_whitelist_entry_wins() {
        let config = config();
        let mut store = base_store();
        let mut directory = PairDirectory::default();

        // Both qualify; ANCHOR precedes NATIVE, no averaging
        let mut via_anchor = pair(X_ANCHOR, TOKEN_X, ANCHOR);
        via_anchor.reserve_native = dec("50");
        via_anchor.token1_price = dec("10");
        store.save_pair(via_anchor);
        directory.register(TOKEN_X, ANCHOR, X_ANCHOR);

        let mut via_native = pair(X_NATIVE, TOKEN_X, NATIVE);
        via_native.reserve_native = dec("50");
        via_native.token1_price = dec("3");
        store.save_pair(via_native);
        directory.register(TOKEN_X, NATIVE, X_NATIVE);

        // 10 ANCHOR * 0.2 native
        assert_eq!(
            find_native_per_token(TOKEN_X, &store, &directory, &config).unwrap(),
            dec("2")
        );
    }

    #[test]
    fn test_zero_address_lookup_means_no_pair() {
        struct ZeroLookup;
        impl PairLookup for ZeroLookup {
            fn get_pair(&self, _: &str, _: &str) -> Option<String> {
                Some(ZERO_ADDRESS.to_string())
            }
        }

        let config = config();
        let store = base_store();
        assert_eq!(
            find_native_per_token(TOKEN_X, &store, &ZeroLookup, &config).unwrap(),
            BigDecimal::zero()
        );
    }

    #[test]
    fn test_missing_counter_token_is_an_error() {
        let config = config();
        let mut store = MemoryStore::new();
        let mut directory = PairDirectory::default();

        let mut p = pair(X_STABLE, TOKEN_X, STABLE_B);
        p.reserve_native = dec("100");
        p.token1_price = dec("1");
        store.save_pair(p);
        directory.register(TOKEN_X, STABLE_B, X_STABLE);

        assert!(find_native_per_token(TOKEN_X, &store, &directory, &config).is_err());
    }

    #[test]
    fn test_missing_pair_record_is_an_error() {
        let config = config();
        let store = base_store();
        let mut directory = PairDirectory::default();
        directory.register(TOKEN_X, NATIVE, X_NATIVE);

        assert!(find_native_per_token(TOKEN_X, &store, &directory, &config).is_err());
    }

    #[test]
    fn test_repeated_resolution_is_identical() {
        let config = config();
        let mut store = base_store();
        let mut directory = PairDirectory::default();
        let mut p = pair(X_STABLE, TOKEN_X, STABLE_B);
        p.reserve_native = dec("100");
        p.token1_price = dec("2.5");
        store.save_pair(p);
        directory.register(TOKEN_X, STABLE_B, X_STABLE);

        let first = find_native_per_token(TOKEN_X, &store, &directory, &config).unwrap();
        let second = find_native_per_token(TOKEN_X, &store, &directory, &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, dec("0.001"));
    }
}
