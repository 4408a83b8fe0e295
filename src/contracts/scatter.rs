//! Scatter (disperse) contract bindings

use alloy::sol;

sol! {
    /// Sends native or token amounts to many recipients in one transaction
    #[sol(rpc)]
    interface IScatter {
        function disperseEther(address[] recipients, uint256[] values) external payable;

        function disperseToken(address token, address[] recipients, uint256[] values) external;

        function disperseTokenSimple(address token, address[] recipients, uint256[] values) external;
    }
}
