//! [`ChainClient`]: contract and account reads through an alloy provider.

use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::TransactionRequest as CallRequest;
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::rpc::error::{RpcError, RpcResult};
use crate::rpc::{AccountReader, ContractReader};

/// Read-only client for one node endpoint.
#[derive(Clone)]
pub struct ChainClient {
    provider: DynProvider,
    endpoint: String,
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl ChainClient {
    /// Client for an HTTP(S) JSON-RPC endpoint.
    pub fn connect_http(endpoint: &str) -> RpcResult<Self> {
        let url = endpoint
            .parse::<reqwest::Url>()
            .map_err(|e| RpcError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_http(url)
            .erased();
        Ok(Self::from_provider(provider, endpoint))
    }

    /// Wrap an already-built provider.
    pub fn from_provider(provider: DynProvider, endpoint: impl Into<String>) -> Self {
        ChainClient {
            provider,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ContractReader for ChainClient {
    #[instrument(skip(self, data), fields(endpoint = %self.endpoint, to = %to))]
    async fn call(&self, to: Address, data: Bytes) -> RpcResult<Bytes> {
        let request = CallRequest::default().to(to).input(data.into());
        let output = self.provider.call(request).await?;
        debug!(len = output.len(), "eth_call returned");
        Ok(output)
    }
}

#[async_trait]
impl AccountReader for ChainClient {
    async fn chain_id(&self) -> RpcResult<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn balance(&self, address: Address) -> RpcResult<U256> {
        Ok(self.provider.get_balance(address).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U64;
    use alloy_transport::mock::Asserter;

    fn mocked() -> (ChainClient, Asserter) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter.clone())
            .erased();
        (ChainClient::from_provider(provider, "mock"), asserter)
    }

    #[tokio::test]
    async fn test_call_returns_raw_output() {
        let (client, asserter) = mocked();
        asserter.push_success(&Bytes::from(vec![0x00, 0x01]));

        let out = client
            .call(Address::repeat_byte(0xaa), Bytes::from(vec![0x12, 0x34]))
            .await
            .unwrap();
        assert_eq!(out.as_ref(), &[0x00, 0x01]);
    }

    #[tokio::test]
    async fn test_node_error_is_mapped() {
        let (client, asserter) = mocked();
        asserter.push_failure_msg("execution reverted");

        let err = client
            .call(Address::repeat_byte(0xaa), Bytes::new())
            .await
            .unwrap_err();
        match err {
            RpcError::Node { message, .. } => assert_eq!(message, "execution reverted"),
            other => panic!("expected node error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chain_id_and_balance() {
        let (client, asserter) = mocked();
        asserter.push_success(&U64::from(11155111u64));
        asserter.push_success(&U256::from(42u64));

        assert_eq!(client.chain_id().await.unwrap(), 11155111);
        assert_eq!(
            client.balance(Address::repeat_byte(1)).await.unwrap(),
            U256::from(42u64)
        );
    }

    #[test]
    fn test_bad_endpoint_is_rejected() {
        let err = ChainClient::connect_http("not a url").unwrap_err();
        assert!(matches!(err, RpcError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_http_endpoint_is_kept() {
        let client = ChainClient::connect_http("http://localhost:8545").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8545");
    }
}
