use bigdecimal::BigDecimal;
use log::{debug, warn};
use num_traits::Zero;

use super::{Anchor, PricingConfig};
use crate::db::{EntityStore, Pair};

/// Current USD price of the native asset.
///
/// Reads the primary anchor pair and falls back to the secondary one when
/// the primary does not exist yet. The stablecoin is assumed pegged, so the
/// stablecoin-per-native price is the USD price. Returns zero when neither
/// anchor pair has been created.
pub fn get_native_price_in_usd<S>(store: &S, config: &PricingConfig) -> BigDecimal
where
    S: EntityStore + ?Sized,
{
    for anchor in [&config.primary_anchor, &config.secondary_anchor] {
        if let Some(pair) = store.load_pair(&anchor.pair) {
            debug!(
                "Anchor pair {} prices {}, {}",
                pair.address, pair.token0_price, pair.token1_price
            );
            return stablecoin_price(&pair, anchor);
        }
    }

    warn!("No anchor pair indexed yet, native price unavailable");
    BigDecimal::zero()
}

/// Stablecoin units per native unit, read from the stablecoin's side.
fn stablecoin_price(pair: &Pair, anchor: &Anchor) -> BigDecimal {
    if pair.token0 == anchor.stablecoin {
        pair.token0_price.clone()
    } else {
        pair.token1_price.clone()
    }
}
