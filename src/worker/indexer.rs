use std::{sync::Arc, time::Duration, time::Instant};

use alloy::{
    primitives::{Address, B256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{Filter, Log},
    sol_types::SolEvent,
};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    abis::{transfer, v2},
    config::{IndexerSettings, Settings},
    db::MemoryStore,
    pricing::PricingConfig,
    worker::{parse_logs, EventProcessor, PairDirectory, TokenFetcher},
};

/// Maximum attempts for one range of `eth_getLogs` queries
const MAX_RETRIES: u32 = 3;

/// Delay between retries (exponential backoff base)
const RETRY_DELAY_MS: u64 = 500;

/// Interval between progress logs
const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Walks a block range over JSON-RPC and feeds the V2 events into the
/// valuation engine, persisting a snapshot after every chunk.
pub struct Indexer {
    provider: DynProvider,
    token_fetcher: TokenFetcher,
    processor: EventProcessor<MemoryStore>,
    settings: IndexerSettings,
    factory: Address,
}

impl Indexer {
    pub fn new(settings: &Settings) -> Result<Self> {
        let url = Url::parse(&settings.rpc.url).context("Invalid RPC URL")?;
        let provider = DynProvider::new(ProviderBuilder::new().connect_http(url));

        let factory: Address = settings
            .indexer
            .factory
            .parse()
            .context("Invalid factory address")?;

        let store = MemoryStore::load(&settings.indexer.snapshot_path)?;
        let directory = PairDirectory::from_pairs(store.pairs());
        let config = Arc::new(PricingConfig::from_settings(&settings.pricing));

        Ok(Self {
            token_fetcher: TokenFetcher::new(provider.clone()),
            provider,
            processor: EventProcessor::new(config, store, directory),
            settings: settings.indexer.clone(),
            factory,
        })
    }

    pub fn store(&self) -> &MemoryStore {
        self.processor.store()
    }

    /// Index until the end block (or the head at startup) is reached, or
    /// until cancelled. Progress is saved after each chunk, so an interrupted
    /// run resumes at the first unprocessed block.
    pub async fn run(&mut self, cancellation_token: CancellationToken) -> Result<()> {
        let end_block = match self.settings.end_block {
            Some(block) => block,
            None => self
                .provider
                .get_block_number()
                .await
                .context("Failed to fetch chain head")?,
        };

        let mut from_block = self
            .store()
            .last_block
            .map(|block| block + 1)
            .unwrap_or(self.settings.start_block)
            .max(self.settings.start_block);
        let chunk_size = self.settings.chunk_size.max(1);

        info!("Indexing blocks {} to {}", from_block, end_block);

        let mut last_progress_log = Instant::now();

        while from_block <= end_block {
            let to_block = (from_block + chunk_size - 1).min(end_block);

            let logs = tokio::select! {
                _ = cancellation_token.cancelled() => {
                    info!("Indexer received cancellation signal");
                    break;
                },
                logs = self.fetch_logs_with_retry(from_block, to_block) => logs?,
            };

            self.process_chunk(logs).await?;

            self.processor.store_mut().last_block = Some(to_block);
            self.save_snapshot()?;

            if last_progress_log.elapsed() >= PROGRESS_LOG_INTERVAL || to_block == end_block {
                let store = self.store();
                info!(
                    "Block {} / {} | {} pairs | {} tokens",
                    to_block,
                    end_block,
                    store.pair_count(),
                    store.token_count()
                );
                last_progress_log = Instant::now();
            }

            from_block = to_block + 1;
        }

        Ok(())
    }

    pub fn save_snapshot(&self) -> Result<()> {
        self.store().save(&self.settings.snapshot_path)
    }

    async fn process_chunk(&mut self, logs: Vec<Log>) -> Result<()> {
        let parse_result = parse_logs(logs);

        // Pairs are only created for tokens with metadata, so fetch before processing
        let missing: Vec<String> = parse_result
            .token_addresses
            .into_iter()
            .filter(|address| !self.store().contains_token(address))
            .collect();

        if !missing.is_empty() {
            let tokens = self.token_fetcher.get_tokens(&missing).await;
            self.processor.insert_tokens(tokens.into_values());
        }

        self.processor.process_batch(&parse_result.parsed_logs)?;

        debug!("Processed {} logs", parse_result.parsed_logs.len());

        Ok(())
    }

    async fn fetch_logs_with_retry(&self, from_block: u64, to_block: u64) -> Result<Vec<Log>> {
        let mut attempt = 0;
        loop {
            match self.fetch_logs(from_block, to_block).await {
                Ok(logs) => return Ok(logs),
                Err(e) if attempt + 1 < MAX_RETRIES => {
                    warn!(
                        "Fetching logs {}-{} failed (attempt {}): {:#}",
                        from_block,
                        to_block,
                        attempt + 1,
                        e
                    );
                    let delay = Duration::from_millis(RETRY_DELAY_MS * 2_u64.pow(attempt));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                },
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to fetch logs {from_block}-{to_block}"))
                },
            }
        }
    }

    /// Factory pair creations, pair reserve and swap events, and LP mints.
    ///
    /// Sync/Swap/Transfer are not filtered by address: events of contracts
    /// that are not known pairs are ignored by the processor.
    async fn fetch_logs(&self, from_block: u64, to_block: u64) -> Result<Vec<Log>> {
        let pair_created = Filter::new()
            .from_block(from_block)
            .to_block(to_block)
            .address(self.factory)
            .event_signature(v2::PairCreated::SIGNATURE_HASH);

        let pair_activity = Filter::new()
            .from_block(from_block)
            .to_block(to_block)
            .event_signature(vec![v2::Sync::SIGNATURE_HASH, v2::Swap::SIGNATURE_HASH]);

        let mints = Filter::new()
            .from_block(from_block)
            .to_block(to_block)
            .event_signature(transfer::Transfer::SIGNATURE_HASH)
            .topic1(B256::ZERO);

        let (mut logs, activity, mints) = futures::try_join!(
            self.provider.get_logs(&pair_created),
            self.provider.get_logs(&pair_activity),
            self.provider.get_logs(&mints),
        )?;

        logs.extend(activity);
        logs.extend(mints);

        Ok(logs)
    }
}
