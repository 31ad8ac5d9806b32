//! DeFi Interactor Core Library
//!
//! Role reconciliation, managed-account queries, permission checks and Safe
//! multisig proposals for a deployed DeFi Interactor contract.

pub mod balance;
pub mod config;
pub mod contract;
pub mod domain;
pub mod fakes;
pub mod interactor;
pub mod managed_accounts;
pub mod obs;
pub mod permissions;
pub mod proposal;
pub mod reconcile;
pub mod rpc;
pub mod telemetry;

pub use balance::{format_ether_fixed, network_info, read_wallet_balance, WalletBalance};

pub use config::{ConfigError, ConfigResult, InteractorConfig};

pub use contract::{interactor_abi, IDefiInteractor, ISafe};

pub use domain::{
    ManagedAccount, QueryError, QueryResult, RoleId, RoleInfo, RolePreset, RoleSet,
};

pub use interactor::{DefiInteractor, RoleReader};

pub use managed_accounts::{
    fetch_managed_accounts, FetchOutcome, Invocation, ManagedAccountsQuery, ManagedAccountsState,
};

pub use permissions::{
    check_permissions, is_safe_owner, read_status, ContractStatus, Permissions, RolePermission,
};

pub use proposal::{
    build_safe_tx, encode_call, encode_function_call, encode_multisend, grant_role, pause,
    revoke_role, safe_tx_hash, tx_service_url, unpause, MultisigProposer, Operation,
    ProposalError, ProposalReceipt, ProposalResult, SafeTransactionService, SafeTx, SafeTxSigner,
    TransactionRequest, MULTISEND_CALL_ONLY,
};

pub use reconcile::{reconcile, reconcile_roles, RoleMembers};

pub use rpc::{call_contract, AccountReader, ChainClient, ContractReader, RpcError, RpcResult};

pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
