use bigdecimal::BigDecimal;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// JSON-RPC endpoint used for log and token metadata fetches.
#[derive(Debug, Deserialize, Clone)]
pub struct RpcSettings {
    pub url: String,
}

/// Indexer range and persistence configuration.
///
/// The indexer walks `[start_block, end_block]` in `chunk_size` windows.
/// When `end_block` is omitted the chain head at startup is used.
#[derive(Debug, Deserialize, Clone)]
pub struct IndexerSettings {
    /// V2 factory emitting `PairCreated`
    pub factory: String,
    #[serde(default)]
    pub start_block: u64,
    #[serde(default)]
    pub end_block: Option<u64>,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

fn default_chunk_size() -> u64 {
    2_000
}

fn default_snapshot_path() -> String {
    "prism-snapshot.json".to_string()
}

/// One native/stablecoin pool used to bootstrap the native USD price.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AnchorSettings {
    pub pair: String,
    pub stablecoin: String,
}

/// Valuation constants.
///
/// Defaults are the Solarbeam deployment on Moonriver: WMOVR is the native
/// token, WMOVR/FRAX is the preferred anchor and WMOVR/USDC the fallback.
#[derive(Debug, Deserialize, Clone)]
pub struct PricingSettings {
    #[serde(default = "default_native_token")]
    pub native_token: String,
    /// Search order matters: the first qualifying pair wins.
    #[serde(default = "default_whitelist")]
    pub whitelist: Vec<String>,
    #[serde(default = "default_primary_anchor")]
    pub primary_anchor: AnchorSettings,
    #[serde(default = "default_secondary_anchor")]
    pub secondary_anchor: AnchorSettings,
    /// Minimum `reserve_native` (strictly greater) for a pair to set a derived price
    #[serde(default = "default_minimum_liquidity_threshold_native")]
    pub minimum_liquidity_threshold_native: BigDecimal,
    /// Minimum USD reserve for young pairs to count towards tracked volume
    #[serde(default = "default_minimum_usd_threshold_new_pairs")]
    pub minimum_usd_threshold_new_pairs: BigDecimal,
    /// Pairs with fewer providers than this are gated by the USD threshold
    #[serde(default = "default_minimum_liquidity_providers")]
    pub minimum_liquidity_providers: u64,
}

fn default_native_token() -> String {
    "0x98878b06940ae243284ca214f92bb71a2b032b8a".to_string() // WMOVR
}

fn default_whitelist() -> Vec<String> {
    vec![
        "0x6bd193ee6d2104f14f94e2ca6efefae561a4334b".to_string(), // SOLAR
        "0x98878b06940ae243284ca214f92bb71a2b032b8a".to_string(), // WMOVR
        "0xe3f5a90f9cb311505cd691a46596599aa1a0ad7d".to_string(), // USDC
        "0x5d9ab5522c64e1f6ef5e3627eccc093f56167818".to_string(), // BUSD
        "0x1a93b23281cc1cde4c4741353f3064709a16197d".to_string(), // FRAX
    ]
}

fn default_primary_anchor() -> AnchorSettings {
    AnchorSettings {
        pair: "0x2cc54b4a3878e36e1c754871438113c1117a3ad7".to_string(),
        stablecoin: "0x1a93b23281cc1cde4c4741353f3064709a16197d".to_string(),
    }
}

fn default_secondary_anchor() -> AnchorSettings {
    AnchorSettings {
        pair: "0xe537f70a8b62204832b8ba91940b77d3f79aeb81".to_string(),
        stablecoin: "0xe3f5a90f9cb311505cd691a46596599aa1a0ad7d".to_string(),
    }
}

fn default_minimum_liquidity_threshold_native() -> BigDecimal {
    BigDecimal::from(5)
}

fn default_minimum_usd_threshold_new_pairs() -> BigDecimal {
    BigDecimal::from(3000)
}

fn default_minimum_liquidity_providers() -> u64 {
    5
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            native_token: default_native_token(),
            whitelist: default_whitelist(),
            primary_anchor: default_primary_anchor(),
            secondary_anchor: default_secondary_anchor(),
            minimum_liquidity_threshold_native: default_minimum_liquidity_threshold_native(),
            minimum_usd_threshold_new_pairs: default_minimum_usd_threshold_new_pairs(),
            minimum_liquidity_providers: default_minimum_liquidity_providers(),
        }
    }
}

/// Root application configuration.
///
/// Loaded from `config.yaml` at startup, with `PRISM_` environment
/// variables (e.g. `PRISM_RPC__URL`) taking precedence.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub rpc: RpcSettings,
    pub indexer: IndexerSettings,
    #[serde(default)]
    pub pricing: PricingSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config"))
            .add_source(
                Environment::with_prefix("PRISM")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}
