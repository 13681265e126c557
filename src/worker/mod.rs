pub mod directory;
pub mod indexer;
pub mod parser;
pub mod processor;
pub mod token_fetcher;

pub use directory::PairDirectory;
pub use indexer::Indexer;
pub use parser::{parse_logs, ParseResult, ParsedLog};
pub use processor::EventProcessor;
pub use token_fetcher::TokenFetcher;
