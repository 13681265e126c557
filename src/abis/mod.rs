pub mod erc20;
pub mod multicall;
pub mod transfer;
pub mod v2;

pub use erc20::IERC20;
pub use multicall::{Call3, IMulticall3, McResult};
pub use transfer::Transfer;
pub use v2::{PairCreated, Swap, Sync};
