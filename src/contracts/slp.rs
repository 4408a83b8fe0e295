//! SLP token contract bindings

use alloy::sol;

sol! {
    /// SLP token interface, including the reward checkpoint used by claims
    #[sol(rpc)]
    interface ISlp {
        /// Redeem a claim voucher signed by the game server
        function checkpoint(
            address _owner,
            uint256 _amount,
            uint256 _createdAt,
            bytes _signature
        ) external returns (uint256 _balance);

        /// Returns the balance of an account
        function balanceOf(address account) external view returns (uint256);

        /// Transfers tokens to a recipient
        function transfer(address _to, uint256 _value) external returns (bool _success);
    }
}
