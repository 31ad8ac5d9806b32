//! Safe transaction construction, hashing and signing.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{sol, Eip712Domain, SolStruct};
use async_trait::async_trait;

use crate::proposal::error::{ProposalError, ProposalResult};
use crate::proposal::multisend::encode_multisend;
use crate::proposal::TransactionRequest;

sol! {
    /// EIP-712 message every Safe owner signs.
    #[derive(Debug, PartialEq, Eq)]
    struct SafeTx {
        address to;
        uint256 value;
        bytes data;
        uint8 operation;
        uint256 safeTxGas;
        uint256 baseGas;
        uint256 gasPrice;
        address gasToken;
        address refundReceiver;
        uint256 nonce;
    }
}

/// How the Safe invokes `SafeTx::to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Operation {
    Call = 0,
    DelegateCall = 1,
}

/// Fold a batch into one Safe transaction at `nonce`.
///
/// A single call is executed directly; several go through `multisend` by
/// delegate call. Gas and refund fields are left at zero so the executor pays.
pub fn build_safe_tx(
    transactions: &[TransactionRequest],
    multisend: Address,
    nonce: u64,
) -> ProposalResult<SafeTx> {
    let (to, value, data, operation) = match transactions {
        [] => return Err(ProposalError::EmptyBatch),
        [single] => (
            single.to,
            single.value,
            single.data.clone(),
            Operation::Call,
        ),
        many => (
            multisend,
            U256::ZERO,
            encode_multisend(many),
            Operation::DelegateCall,
        ),
    };

    Ok(SafeTx {
        to,
        value,
        data,
        operation: operation as u8,
        safeTxGas: U256::ZERO,
        baseGas: U256::ZERO,
        gasPrice: U256::ZERO,
        gasToken: Address::ZERO,
        refundReceiver: Address::ZERO,
        nonce: U256::from(nonce),
    })
}

/// EIP-712 domain of `safe` (Safe >= 1.3.0: chain id and verifying contract).
pub fn safe_domain(chain_id: u64, safe: Address) -> Eip712Domain {
    Eip712Domain::new(None, None, Some(U256::from(chain_id)), Some(safe), None)
}

/// The `safeTxHash` owners sign and the service indexes by.
pub fn safe_tx_hash(tx: &SafeTx, chain_id: u64, safe: Address) -> B256 {
    tx.eip712_signing_hash(&safe_domain(chain_id, safe))
}

/// Signs Safe transaction hashes on behalf of one owner.
#[async_trait]
pub trait SafeTxSigner: Send + Sync {
    /// Owner address the signature recovers to.
    fn owner(&self) -> Address;

    /// 65-byte `r | s | v` signature over `hash`, `v` in {27, 28}.
    async fn sign_safe_tx_hash(&self, hash: B256) -> ProposalResult<Bytes>;
}

#[async_trait]
impl SafeTxSigner for PrivateKeySigner {
    fn owner(&self) -> Address {
        Signer::address(self)
    }

    async fn sign_safe_tx_hash(&self, hash: B256) -> ProposalResult<Bytes> {
        let signature = Signer::sign_hash(self, &hash)
            .await
            .map_err(|e| ProposalError::Signer(e.to_string()))?;
        Ok(Bytes::from(signature.as_bytes().to_vec()))
    }
}
