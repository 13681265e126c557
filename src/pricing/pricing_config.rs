use bigdecimal::BigDecimal;
use rustc_hash::FxHashSet;

use crate::config::{AnchorSettings, PricingSettings};

/// Ordered set of trusted anchor tokens.
///
/// Membership is a hash lookup; iteration follows the configured order so
/// the pair chosen by the derived-price search is reproducible.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    order: Vec<String>,
    members: FxHashSet<String>,
}

impl Whitelist {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut order = Vec::new();
        let mut members = FxHashSet::default();

        for token in tokens {
            let token = token.as_ref().to_lowercase();
            // Keep the first occurrence, later duplicates would only repeat lookups
            if members.insert(token.clone()) {
                order.push(token);
            }
        }

        Self { order, members }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.members.contains(token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// A native/stablecoin pair read to bootstrap the native USD price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub pair: String,
    pub stablecoin: String,
}

impl From<&AnchorSettings> for Anchor {
    fn from(settings: &AnchorSettings) -> Self {
        Self {
            pair: settings.pair.to_lowercase(),
            stablecoin: settings.stablecoin.to_lowercase(),
        }
    }
}

/// Immutable valuation configuration passed to every pricing component.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Wrapped native token, priced at exactly 1 native unit
    pub native_token: String,
    pub whitelist: Whitelist,
    pub primary_anchor: Anchor,
    pub secondary_anchor: Anchor,
    pub minimum_liquidity_threshold_native: BigDecimal,
    pub minimum_usd_threshold_new_pairs: BigDecimal,
    pub minimum_liquidity_providers: u64,
}

impl PricingConfig {
    pub fn from_settings(settings: &PricingSettings) -> Self {
        Self {
            native_token: settings.native_token.to_lowercase(),
            whitelist: Whitelist::new(&settings.whitelist),
            primary_anchor: Anchor::from(&settings.primary_anchor),
            secondary_anchor: Anchor::from(&settings.secondary_anchor),
            minimum_liquidity_threshold_native: settings.minimum_liquidity_threshold_native.clone(),
            minimum_usd_threshold_new_pairs: settings.minimum_usd_threshold_new_pairs.clone(),
            minimum_liquidity_providers: settings.minimum_liquidity_providers,
        }
    }

    pub fn is_native(&self, token: &str) -> bool {
        self.native_token == token
    }

    pub fn is_whitelisted(&self, token: &str) -> bool {
        self.whitelist.contains(token)
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self::from_settings(&PricingSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelist_keeps_order_and_lowercases() {
        let whitelist = Whitelist::new(["0xBBBB", "0xaaaa", "0xbbbb", "0xCCCC"]);
        assert_eq!(whitelist.iter().collect::<Vec<_>>(), vec!["0xbbbb", "0xaaaa", "0xcccc"]);
        assert_eq!(whitelist.len(), 3);
        assert!(whitelist.contains("0xcccc"));
        assert!(!whitelist.contains("0xCCCC"));
        assert!(!whitelist.contains("0xdddd"));
    }

    #[test]
    fn test_default_config_classifies_native_and_whitelist() {
        let config = PricingConfig::default();
        assert!(config.is_native("0x98878b06940ae243284ca214f92bb71a2b032b8a"));
        assert!(config.is_whitelisted("0x98878b06940ae243284ca214f92bb71a2b032b8a"));
        assert!(config.is_whitelisted("0x1a93b23281cc1cde4c4741353f3064709a16197d"));
        assert!(!config.is_whitelisted("0x0000000000000000000000000000000000000001"));
        assert_eq!(
            config.primary_anchor.pair,
            "0x2cc54b4a3878e36e1c754871438113c1117a3ad7"
        );
    }
}
