//! Log parsing module for RPC logs.
//!
//! Decodes V2 factory/pair logs into typed structures and orders them the
//! way they were emitted, which the processor relies on.

use alloy::{rpc::types::Log, sol_types::SolEvent};

use crate::{
    abis::{transfer, v2},
    utils::{address_key, hex_encode},
};

/// A decoded log with its position in the chain.
pub enum ParsedLog {
    PairCreated {
        event: v2::PairCreated,
        block_number: u64,
        log_index: u64,
    },
    Sync {
        event: v2::Sync,
        pair: String,
        block_number: u64,
        log_index: u64,
    },
    Swap {
        event: v2::Swap,
        pair: String,
        block_number: u64,
        log_index: u64,
        tx_hash: String,
    },
    /// LP token transfer emitted by a pair contract (or any ERC-20, filtered later)
    Transfer {
        event: transfer::Transfer,
        pair: String,
        block_number: u64,
        log_index: u64,
    },
}

impl ParsedLog {
    /// Sort key: `(block_number, log_index)`.
    pub fn position(&self) -> (u64, u64) {
        match self {
            ParsedLog::PairCreated {
                block_number,
                log_index,
                ..
            }
            | ParsedLog::Sync {
                block_number,
                log_index,
                ..
            }
            | ParsedLog::Swap {
                block_number,
                log_index,
                ..
            }
            | ParsedLog::Transfer {
                block_number,
                log_index,
                ..
            } => (*block_number, *log_index),
        }
    }
}

/// Result of parsing a batch of logs.
pub struct ParseResult {
    /// Parsed logs in chain order
    pub parsed_logs: Vec<ParsedLog>,
    /// Token addresses of newly created pairs (for fetching token metadata)
    pub token_addresses: Vec<String>,
}

/// Parse RPC logs into typed structures.
///
/// Logs with unknown or undecodable signatures are dropped. The result is
/// sorted by `(block_number, log_index)` since batches are assembled from
/// several `eth_getLogs` queries.
pub fn parse_logs(logs: impl IntoIterator<Item = Log>) -> ParseResult {
    let mut parsed_logs: Vec<ParsedLog> = Vec::new();
    let mut token_addresses: Vec<String> = Vec::new();

    for log in logs {
        let Some(topic0) = log.inner.data.topics().first().copied() else {
            continue;
        };

        let block_number = log.block_number.unwrap_or(0);
        let log_index = log.log_index.unwrap_or(0);
        let log_address = address_key(&log.inner.address);
        let data = &log.inner.data;

        match topic0 {
            t if t == v2::PairCreated::SIGNATURE_HASH => {
                if let Ok(event) = v2::PairCreated::decode_log_data(data) {
                    token_addresses.push(address_key(&event.token0));
                    token_addresses.push(address_key(&event.token1));
                    parsed_logs.push(ParsedLog::PairCreated {
                        event,
                        block_number,
                        log_index,
                    });
                }
            },
            t if t == v2::Sync::SIGNATURE_HASH => {
                if let Ok(event) = v2::Sync::decode_log_data(data) {
                    parsed_logs.push(ParsedLog::Sync {
                        event,
                        pair: log_address,
                        block_number,
                        log_index,
                    });
                }
            },
            t if t == v2::Swap::SIGNATURE_HASH => {
                if let Ok(event) = v2::Swap::decode_log_data(data) {
                    let tx_hash = log
                        .transaction_hash
                        .as_ref()
                        .map(|h| hex_encode(h.as_slice()))
                        .unwrap_or_default();
                    parsed_logs.push(ParsedLog::Swap {
                        event,
                        pair: log_address,
                        block_number,
                        log_index,
                        tx_hash,
                    });
                }
            },
            t if t == transfer::Transfer::SIGNATURE_HASH => {
                if let Ok(event) = transfer::Transfer::decode_log_data(data) {
                    parsed_logs.push(ParsedLog::Transfer {
                        event,
                        pair: log_address,
                        block_number,
                        log_index,
                    });
                }
            },
            _ => {},
        }
    }

    parsed_logs.sort_by_key(ParsedLog::position);
    token_addresses.sort_unstable();
    token_addresses.dedup();

    ParseResult {
        parsed_logs,
        token_addresses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{aliases::U112, Address, LogData, U256};

    fn rpc_log(address: Address, data: LogData, block_number: u64, log_index: u64) -> Log {
        Log {
            inner: alloy::primitives::Log { address, data },
            block_number: Some(block_number),
            log_index: Some(log_index),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_orders_by_block_and_log_index() {
        let pair = Address::repeat_byte(0x11);
        let sync = v2::Sync {
            reserve0: U112::from(10u64),
            reserve1: U112::from(20u64),
        };
        let swap = v2::Swap {
            sender: Address::ZERO,
            amount0In: U256::from(1u64),
            amount1In: U256::ZERO,
            amount0Out: U256::ZERO,
            amount1Out: U256::from(2u64),
            to: Address::ZERO,
        };

        let logs = vec![
            rpc_log(pair, swap.encode_log_data(), 11, 3),
            rpc_log(pair, sync.encode_log_data(), 11, 2),
            rpc_log(pair, sync.encode_log_data(), 10, 7),
        ];

        let result = parse_logs(logs);
        let positions: Vec<_> = result.parsed_logs.iter().map(ParsedLog::position).collect();
        assert_eq!(positions, vec![(10, 7), (11, 2), (11, 3)]);
        assert!(matches!(result.parsed_logs[2], ParsedLog::Swap { .. }));
    }

    #[test]
    fn test_parse_pair_created_collects_tokens() {
        let factory = Address::repeat_byte(0xfa);
        let token0 = Address::repeat_byte(0x0a);
        let token1 = Address::repeat_byte(0x0b);
        let created = v2::PairCreated {
            token0,
            token1,
            pair: Address::repeat_byte(0x11),
            pairIndex: U256::from(1u64),
        };
        let unrelated = LogData::new_unchecked(vec![alloy::primitives::B256::ZERO], Default::default());

        let result = parse_logs(vec![
            rpc_log(factory, created.encode_log_data(), 5, 0),
            rpc_log(factory, unrelated, 5, 1),
        ]);

        assert_eq!(result.parsed_logs.len(), 1);
        assert_eq!(
            result.token_addresses,
            vec![
                "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a".to_string(),
                "0x0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b".to_string(),
            ]
        );
    }
}
