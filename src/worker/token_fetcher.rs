use crate::abis::erc20::IERC20;
use crate::abis::multicall::{Call3, IMulticall3};
use crate::db::Token;
use alloy::providers::{DynProvider, MULTICALL3_ADDRESS};
use alloy::sol_types::SolCall;
use anyhow::{Context, Result};
use log::{debug, warn};
use moka::future::Cache;
use rustc_hash::FxHashMap;
use std::time::Duration;

/// Token metadata fetcher using multicall3
#[derive(Clone)]
pub struct TokenFetcher {
    provider: DynProvider,
    /// Cache of token addresses that failed to fetch (invalid contracts, no decimals, etc.)
    /// Prevents repeatedly trying to fetch tokens that will never succeed
    invalid_tokens: Cache<String, ()>,
}

/// Maximum retries for multicall
const MAX_RETRIES: u32 = 3;

/// Delay between retries (exponential backoff base)
const RETRY_DELAY_MS: u64 = 100;

/// Timeout for individual RPC calls (30 seconds)
const RPC_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Tokens with more decimals than this are treated as invalid
const MAX_DECIMALS: u8 = 24;

impl TokenFetcher {
    pub fn new(provider: DynProvider) -> Self {
        // Known invalid tokens are retried after an hour in case the contract was fixed
        let invalid_tokens = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(3600))
            .build();

        Self {
            provider,
            invalid_tokens,
        }
    }

    /// Fetch metadata for `addresses`, keyed by lowercase address.
    ///
    /// Tokens that cannot be fetched are absent from the result; pairs
    /// referencing them are not indexed.
    pub async fn get_tokens(&self, addresses: &[String]) -> FxHashMap<String, Token> {
        let mut result = FxHashMap::default();

        let valid_addresses: Vec<String> = addresses
            .iter()
            .filter(|addr| !self.invalid_tokens.contains_key(*addr))
            .cloned()
            .collect();

        if valid_addresses.is_empty() {
            return result;
        }

        let fetched = self.fetch_metadata_batch(&valid_addresses).await;

        for (requested_addr, maybe_token) in valid_addresses.iter().zip(fetched.into_iter()) {
            match maybe_token {
                Some(token) => {
                    result.insert(requested_addr.clone(), token);
                },
                None => {
                    warn!("Token {} has no readable metadata, skipping", requested_addr);
                    self.invalid_tokens.insert(requested_addr.clone(), ()).await;
                },
            }
        }

        debug!("Fetched {} of {} tokens", result.len(), valid_addresses.len());

        result
    }

    /// Batch size for multicall requests to avoid RPC congestion/timeouts
    const MULTICALL_BATCH_SIZE: usize = 20;

    async fn fetch_metadata_batch(&self, addresses: &[String]) -> Vec<Option<Token>> {
        let mut all_tokens: Vec<Option<Token>> = Vec::with_capacity(addresses.len());

        for chunk in addresses.chunks(Self::MULTICALL_BATCH_SIZE) {
            let batch_tokens = self.fetch_metadata_chunk_with_retry(chunk).await;
            all_tokens.extend(batch_tokens);
        }

        all_tokens
    }

    /// Fetch metadata with retry logic
    async fn fetch_metadata_chunk_with_retry(&self, addresses: &[String]) -> Vec<Option<Token>> {
        for attempt in 0..MAX_RETRIES {
            match self.fetch_metadata_chunk(addresses).await {
                Ok(tokens) => return tokens,
                Err(e) => {
                    debug!("Multicall attempt {} failed: {:#}", attempt + 1, e);
                    if attempt < MAX_RETRIES - 1 {
                        let delay = Duration::from_millis(RETRY_DELAY_MS * 2_u64.pow(attempt));
                        tokio::time::sleep(delay).await;
                    }
                },
            }
        }

        // All retries failed - try individual fetches as fallback
        self.fetch_tokens_individually(addresses).await
    }

    /// Fallback: fetch tokens one by one when multicall fails
    async fn fetch_tokens_individually(&self, addresses: &[String]) -> Vec<Option<Token>> {
        let tasks = addresses.iter().map(|addr| self.fetch_single_token(addr));
        futures::future::join_all(tasks).await
    }

    /// Fetch a single token's metadata
    async fn fetch_single_token(&self, addr: &str) -> Option<Token> {
        let address = addr.parse().ok()?;

        let token_contract = IERC20::new(address, &self.provider);

        // Decimals is required
        let decimals =
            match tokio::time::timeout(RPC_CALL_TIMEOUT, token_contract.decimals().call()).await {
                Ok(Ok(d)) => d,
                _ => return None,
            };

        if decimals > MAX_DECIMALS {
            return None;
        }

        let name = tokio::time::timeout(RPC_CALL_TIMEOUT, token_contract.name().call())
            .await
            .ok()
            .and_then(|r| r.ok())
            .unwrap_or_default();

        let symbol = tokio::time::timeout(RPC_CALL_TIMEOUT, token_contract.symbol().call())
            .await
            .ok()
            .and_then(|r| r.ok())
            .unwrap_or_default();

        Some(Token::new(addr.to_string(), symbol, name, decimals))
    }

    async fn fetch_metadata_chunk(&self, addresses: &[String]) -> Result<Vec<Option<Token>>> {
        let multicall = IMulticall3::new(MULTICALL3_ADDRESS, &self.provider);
        let mut calls = Vec::with_capacity(addresses.len() * 3);

        for addr in addresses {
            let address = addr.parse().context("Invalid address")?;
            let token = IERC20::new(address, &self.provider);

            calls.push(Call3 {
                target: address,
                allowFailure: true,
                callData: token.name().calldata().to_vec().into(),
            });
            calls.push(Call3 {
                target: address,
                allowFailure: true,
                callData: token.symbol().calldata().to_vec().into(),
            });
            calls.push(Call3 {
                target: address,
                allowFailure: true,
                callData: token.decimals().calldata().to_vec().into(),
            });
        }

        let results = tokio::time::timeout(RPC_CALL_TIMEOUT, multicall.aggregate3(calls).call())
            .await
            .context("Multicall timeout")?
            .context("Multicall aggregate3 failed")?;

        // Index-aligned with the input addresses
        let mut tokens: Vec<Option<Token>> = Vec::with_capacity(addresses.len());

        for (i, addr) in addresses.iter().enumerate() {
            let base_idx = i * 3;
            if base_idx + 2 >= results.len() {
                tokens.push(None);
                continue;
            }

            let name_res = &results[base_idx];
            let symbol_res = &results[base_idx + 1];
            let decimals_res = &results[base_idx + 2];

            let decimals = if decimals_res.success {
                match IERC20::decimalsCall::abi_decode_returns(&decimals_res.returnData) {
                    Ok(d) => d,
                    Err(_) => {
                        tokens.push(None);
                        continue;
                    },
                }
            } else {
                tokens.push(None);
                continue;
            };

            if decimals > MAX_DECIMALS {
                tokens.push(None);
                continue;
            }

            // Some tokens (MKR-style) return bytes32 names; those fall back to empty
            let name = if name_res.success {
                IERC20::nameCall::abi_decode_returns(&name_res.returnData).unwrap_or_default()
            } else {
                String::new()
            };

            let symbol = if symbol_res.success {
                IERC20::symbolCall::abi_decode_returns(&symbol_res.returnData).unwrap_or_default()
            } else {
                String::new()
            };

            tokens.push(Some(Token::new(addr.clone(), symbol, name, decimals)));
        }

        Ok(tokens)
    }
}
