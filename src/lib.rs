pub mod abis;
pub mod config;
pub mod db;
pub mod pricing;
pub mod utils;
pub mod worker;

pub use config::Settings;
pub use db::{EntityStore, MemoryStore};
pub use pricing::PricingConfig;
pub use worker::{EventProcessor, Indexer, TokenFetcher};
