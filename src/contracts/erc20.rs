//! ERC20 bindings shared by AXS, WETH, USDC and the scatter approval flow

use alloy::sol;

sol! {
    /// Subset of ERC20 used for balances, payments and scatter approvals
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address _owner) external view returns (uint256);

        function allowance(address _owner, address _spender) external view returns (uint256);

        /// Allow `_spender` to move up to `_value` tokens of the caller
        function approve(address _spender, uint256 _value) external returns (bool _success);

        function transfer(address _to, uint256 _value) external returns (bool _success);
    }
}
