//! Multisig proposal pipeline.
//!
//! Contract calls are encoded into [`TransactionRequest`]s, batched into a
//! single Safe transaction (MultiSend when there is more than one), hashed per
//! EIP-712, signed, and posted to the Safe Transaction Service where the
//! remaining owners co-sign.

pub mod encode;
pub mod error;
pub mod multisend;
pub mod safe_tx;
pub mod tx_service;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use encode::{encode_call, encode_function_call, grant_role, pause, revoke_role, unpause};
pub use error::{ProposalError, ProposalResult};
pub use multisend::{encode_multisend, MULTISEND_CALL_ONLY};
pub use safe_tx::{build_safe_tx, safe_tx_hash, Operation, SafeTx, SafeTxSigner};
pub use tx_service::{read_safe_nonce, tx_service_url, SafeTransactionService};

/// One call to be executed by the Safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub to: Address,
    #[serde(default)]
    pub value: U256,
    pub data: Bytes,
}

impl TransactionRequest {
    /// Zero-value call.
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        TransactionRequest {
            to,
            value: U256::ZERO,
            data: data.into(),
        }
    }
}

/// Result of a successful proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalReceipt {
    pub safe_tx_hash: B256,
    pub nonce: u64,
}

/// Submits a batch of transactions to a multisig for co-signature.
#[async_trait]
pub trait MultisigProposer: Send + Sync {
    async fn propose(&self, transactions: &[TransactionRequest]) -> ProposalResult<ProposalReceipt>;
}
