use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// Key of the process-wide bundle record.
pub const BUNDLE_ID: &str = "1";

/// Singleton holding the current USD price of the native asset.
///
/// Overwritten on every reserve change with the anchor-pair price.
/// A zero price means no anchor pair exists yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: String,
    pub native_price: BigDecimal,
}

impl Default for Bundle {
    fn default() -> Self {
        Self {
            id: BUNDLE_ID.to_string(),
            native_price: BigDecimal::zero(),
        }
    }
}
