use alloy::sol;

sol! {
    /// Emitted by pair contracts for their LP token as well as by ERC-20s.
    event Transfer(address indexed from, address indexed to, uint256 value);
}
