//! Axie ERC-721 contract bindings

use alloy::sol;

sol! {
    /// Axie contract interface (transfers, breeding and ownership queries)
    #[sol(rpc)]
    interface IAxie {
        /// Transfer an axie between accounts
        function safeTransferFrom(address _from, address _to, uint256 _tokenId) external;

        /// Breed two owned axies
        function breedAxies(uint256 _sireId, uint256 _matronId) external returns (bool _success);

        /// Number of axies owned by an account
        function balanceOf(address _owner) external view returns (uint256);

        /// Owner of an axie
        function ownerOf(uint256 _tokenId) external view returns (address);

        /// Axie id at a position in the owner's list
        function tokenOfOwnerByIndex(address _owner, uint256 _index) external view returns (uint256);
    }
}
