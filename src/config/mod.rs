#[allow(clippy::module_inception)]
mod config;

pub use config::{AnchorSettings, IndexerSettings, PricingSettings, RpcSettings, Settings};
