//! Chain-read transport.
//!
//! [`ContractReader`] is the seam between the query layer and the chain: it
//! executes a read-only call against a contract and hands back raw return
//! data. [`AccountReader`] covers the account-level reads (chain id, native
//! balance). [`ChainClient`] implements both over an alloy provider.

pub mod error;
pub mod provider;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;

pub use error::{RpcError, RpcResult};
pub use provider::ChainClient;

/// Read-only access to contract state.
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Execute `data` against `to` at the latest block and return the raw
    /// return data.
    async fn call(&self, to: Address, data: Bytes) -> RpcResult<Bytes>;
}

/// Account-level chain reads.
#[async_trait]
pub trait AccountReader: Send + Sync {
    async fn chain_id(&self) -> RpcResult<u64>;

    /// Native balance of `address` in wei at the latest block.
    async fn balance(&self, address: Address) -> RpcResult<U256>;
}

/// Encode `call`, execute it against `to`, and decode the typed return value.
pub async fn call_contract<C>(
    reader: &dyn ContractReader,
    to: Address,
    call: &C,
) -> RpcResult<C::Return>
where
    C: SolCall + Sync,
{
    let output = reader.call(to, Bytes::from(call.abi_encode())).await?;
    Ok(C::abi_decode_returns(&output)?)
}
