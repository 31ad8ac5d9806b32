//! Safe Transaction Service client.
//!
//! Proposals are posted to the service of the Safe's chain, where the other
//! owners pick them up and add their signatures.

use std::sync::Arc;

use alloy_primitives::{hex, Address, Bytes, B256};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::contract::ISafe;
use crate::domain::{QueryError, QueryResult};
use crate::obs;
use crate::proposal::error::{ProposalError, ProposalResult};
use crate::proposal::multisend::MULTISEND_CALL_ONLY;
use crate::proposal::safe_tx::{build_safe_tx, safe_tx_hash, SafeTx, SafeTxSigner};
use crate::proposal::{MultisigProposer, ProposalReceipt, TransactionRequest};
use crate::rpc::{call_contract, ContractReader};

/// Base URL of the hosted Safe Transaction Service for `chain_id`.
pub fn tx_service_url(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        1 => Some("https://safe-transaction-mainnet.safe.global"),
        10 => Some("https://safe-transaction-optimism.safe.global"),
        137 => Some("https://safe-transaction-polygon.safe.global"),
        8453 => Some("https://safe-transaction-base.safe.global"),
        42161 => Some("https://safe-transaction-arbitrum.safe.global"),
        11155111 => Some("https://safe-transaction-sepolia.safe.global"),
        _ => None,
    }
}

/// Current on-chain nonce of `safe`.
pub async fn read_safe_nonce(reader: &dyn ContractReader, safe: Address) -> QueryResult<u64> {
    let nonce = call_contract(reader, safe, &ISafe::nonceCall {})
        .await
        .map_err(|e| QueryError::read("nonce", e))?;
    Ok(nonce.saturating_to::<u64>())
}

/// Body of `POST /api/v1/safes/{safe}/multisig-transactions/`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProposeTransactionBody {
    safe: String,
    to: String,
    value: String,
    data: Option<String>,
    operation: u8,
    safe_tx_gas: String,
    base_gas: String,
    gas_price: String,
    gas_token: String,
    refund_receiver: String,
    nonce: String,
    contract_transaction_hash: String,
    sender: String,
    signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<String>,
}

impl ProposeTransactionBody {
    pub(crate) fn new(
        safe: Address,
        tx: &SafeTx,
        safe_tx_hash: B256,
        sender: Address,
        signature: &Bytes,
        origin: Option<String>,
    ) -> Self {
        ProposeTransactionBody {
            safe: safe.to_checksum(None),
            to: tx.to.to_checksum(None),
            value: tx.value.to_string(),
            data: (!tx.data.is_empty()).then(|| hex::encode_prefixed(&tx.data)),
            operation: tx.operation,
            safe_tx_gas: tx.safeTxGas.to_string(),
            base_gas: tx.baseGas.to_string(),
            gas_price: tx.gasPrice.to_string(),
            gas_token: tx.gasToken.to_checksum(None),
            refund_receiver: tx.refundReceiver.to_checksum(None),
            nonce: tx.nonce.to_string(),
            contract_transaction_hash: hex::encode_prefixed(safe_tx_hash),
            sender: sender.to_checksum(None),
            signature: hex::encode_prefixed(signature),
            origin,
        }
    }
}

/// [`MultisigProposer`] backed by the Safe Transaction Service.
pub struct SafeTransactionService {
    base_url: String,
    chain_id: u64,
    safe: Address,
    multisend: Address,
    nonce: Option<u64>,
    origin: Option<String>,
    reader: Arc<dyn ContractReader>,
    signer: Arc<dyn SafeTxSigner>,
    http: reqwest::Client,
}

impl SafeTransactionService {
    /// Client for the hosted service of `chain_id`.
    pub fn new(
        chain_id: u64,
        safe: Address,
        reader: Arc<dyn ContractReader>,
        signer: Arc<dyn SafeTxSigner>,
    ) -> ProposalResult<Self> {
        let base_url =
            tx_service_url(chain_id).ok_or(ProposalError::UnsupportedChain(chain_id))?;
        Self::with_base_url(base_url, chain_id, safe, reader, signer)
    }

    /// Client for a self-hosted or otherwise explicit service URL.
    pub fn with_base_url(
        base_url: &str,
        chain_id: u64,
        safe: Address,
        reader: Arc<dyn ContractReader>,
        signer: Arc<dyn SafeTxSigner>,
    ) -> ProposalResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("defi-interactor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(SafeTransactionService {
            base_url: base_url.trim_end_matches('/').to_string(),
            chain_id,
            safe,
            multisend: MULTISEND_CALL_ONLY,
            nonce: None,
            origin: None,
            reader,
            signer,
            http,
        })
    }

    /// Use a MultiSend deployment other than the canonical one.
    pub fn multisend(mut self, multisend: Address) -> Self {
        self.multisend = multisend;
        self
    }

    /// Propose at `nonce` instead of the Safe's current on-chain nonce.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Free-form origin label shown in the Safe interface.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn proposals_url(&self) -> String {
        format!(
            "{}/api/v1/safes/{}/multisig-transactions/",
            self.base_url,
            self.safe.to_checksum(None)
        )
    }

    /// Build and sign the Safe transaction for `transactions` without posting it.
    pub async fn prepare(
        &self,
        transactions: &[TransactionRequest],
    ) -> ProposalResult<(SafeTx, B256, Bytes)> {
        let nonce = match self.nonce {
            Some(nonce) => nonce,
            None => read_safe_nonce(self.reader.as_ref(), self.safe).await?,
        };
        let tx = build_safe_tx(transactions, self.multisend, nonce)?;
        let hash = safe_tx_hash(&tx, self.chain_id, self.safe);
        let signature = self.signer.sign_safe_tx_hash(hash).await?;
        Ok((tx, hash, signature))
    }

    async fn post(&self, tx: &SafeTx, hash: B256, signature: &Bytes) -> ProposalResult<()> {
        let body = ProposeTransactionBody::new(
            self.safe,
            tx,
            hash,
            self.signer.owner(),
            signature,
            self.origin.clone(),
        );
        let url = self.proposals_url();
        debug!(%url, "posting proposal");

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProposalError::Service {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MultisigProposer for SafeTransactionService {
    #[instrument(skip(self, transactions), fields(safe = %self.safe, count = transactions.len()))]
    async fn propose(&self, transactions: &[TransactionRequest]) -> ProposalResult<ProposalReceipt> {
        let result = async {
            let (tx, hash, signature) = self.prepare(transactions).await?;
            self.post(&tx, hash, &signature).await?;
            Ok::<_, ProposalError>(ProposalReceipt {
                safe_tx_hash: hash,
                nonce: tx.nonce.saturating_to::<u64>(),
            })
        }
        .await;

        match &result {
            Ok(receipt) => obs::emit_proposal_submitted(
                self.safe,
                receipt.safe_tx_hash,
                receipt.nonce,
                transactions.len(),
            ),
            Err(err) => obs::emit_proposal_failed(self.safe, err),
        }
        result
    }
}
