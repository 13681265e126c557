use alloy::sol;

sol! {
    event PairCreated(address indexed token0, address indexed token1, address pair, uint256 pairIndex);
    event Sync(uint112 reserve0, uint112 reserve1);
    event Swap(address indexed sender, uint256 amount0In, uint256 amount1In, uint256 amount0Out, uint256 amount1Out, address indexed to);
}
