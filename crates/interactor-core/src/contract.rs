//! Solidity bindings for the DeFi Interactor contract and the Safe.

use alloy_json_abi::JsonAbi;
use alloy_sol_types::sol;

sol! {
    /// Role-gated DeFi Interactor. Only the governing Safe may grant/revoke
    /// roles or toggle the emergency pause.
    #[sol(abi)]
    #[derive(Debug, PartialEq, Eq)]
    interface IDefiInteractor {
        function hasRole(address member, uint16 roleId) external view returns (bool);
        function paused() external view returns (bool);
        function safe() external view returns (address);
        function getSubaccountsByRole(uint16 roleId) external view returns (address[] memory);
        function DEFI_DEPOSIT_ROLE() external view returns (uint16);
        function DEFI_WITHDRAW_ROLE() external view returns (uint16);

        function grantRole(address member, uint16 roleId) external;
        function revokeRole(address member, uint16 roleId) external;
        function pause() external;
        function unpause() external;

        event RoleAssigned(address indexed member, uint16 indexed roleId, uint256 timestamp);
        event RoleRevoked(address indexed member, uint16 indexed roleId, uint256 timestamp);
        event EmergencyPaused(address indexed by, uint256 timestamp);
        event EmergencyUnpaused(address indexed by, uint256 timestamp);
    }

    #[derive(Debug, PartialEq, Eq)]
    interface ISafe {
        function nonce() external view returns (uint256);
        function getOwners() external view returns (address[] memory);
        function getThreshold() external view returns (uint256);
    }
}

/// JSON ABI of the interactor, used for encoding calls by function name.
pub fn interactor_abi() -> JsonAbi {
    IDefiInteractor::abi::contract()
}
