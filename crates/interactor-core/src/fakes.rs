//! In-memory fakes for the collaborator traits (testing only)
//!
//! Provides `MemoryContractReader`, `MemoryRoleReader` and
//! `RecordingProposer` that satisfy the trait contracts without a node or a
//! Safe Transaction Service.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::{QueryError, QueryResult, RoleId};
use crate::interactor::RoleReader;
use crate::proposal::{
    MultisigProposer, ProposalError, ProposalReceipt, ProposalResult, TransactionRequest,
};
use crate::rpc::{AccountReader, ContractReader, RpcError, RpcResult};

// ---------------------------------------------------------------------------
// MemoryContractReader
// ---------------------------------------------------------------------------

/// Canned `eth_call` responses keyed by `(to, calldata)`, plus native
/// balances for [`AccountReader`].
#[derive(Debug)]
pub struct MemoryContractReader {
    responses: Mutex<HashMap<(Address, Bytes), Bytes>>,
    balances: Mutex<HashMap<Address, U256>>,
    chain_id: Mutex<Option<u64>>,
}

impl Default for MemoryContractReader {
    fn default() -> Self {
        MemoryContractReader {
            responses: Mutex::default(),
            balances: Mutex::default(),
            chain_id: Mutex::new(Some(1)),
        }
    }
}

impl MemoryContractReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `call` sent to `to` with `output`.
    pub fn respond<C: SolCall>(&self, to: Address, call: &C, output: Vec<u8>) {
        self.responses
            .lock()
            .unwrap()
            .insert((to, Bytes::from(call.abi_encode())), Bytes::from(output));
    }

    pub fn with_balance(self, address: Address, wei: U256) -> Self {
        self.balances.lock().unwrap().insert(address, wei);
        self
    }

    /// `None` makes `chain_id` fail like an unreachable node.
    pub fn set_chain_id(&self, chain_id: Option<u64>) {
        *self.chain_id.lock().unwrap() = chain_id;
    }
}

#[async_trait]
impl ContractReader for MemoryContractReader {
    async fn call(&self, to: Address, data: Bytes) -> RpcResult<Bytes> {
        self.responses
            .lock()
            .unwrap()
            .get(&(to, data))
            .cloned()
            .ok_or_else(|| RpcError::Node {
                code: 3,
                message: "execution reverted".to_string(),
            })
    }
}

#[async_trait]
impl AccountReader for MemoryContractReader {
    async fn chain_id(&self) -> RpcResult<u64> {
        self.chain_id
            .lock()
            .unwrap()
            .ok_or_else(|| RpcError::Transport("connection refused".to_string()))
    }

    async fn balance(&self, address: Address) -> RpcResult<U256> {
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// MemoryRoleReader
// ---------------------------------------------------------------------------

/// Gate holding back role reads until released.
pub struct ReadGate {
    tx: watch::Sender<bool>,
}

impl ReadGate {
    pub fn release(&self) {
        self.tx.send_replace(true);
    }
}

/// Role membership backed by a `HashMap<RoleId, Vec<Address>>`.
#[derive(Default)]
pub struct MemoryRoleReader {
    members: Mutex<HashMap<RoleId, Vec<Address>>>,
    failing: Mutex<HashSet<RoleId>>,
    hold: Mutex<Option<watch::Receiver<bool>>>,
    reads: AtomicUsize,
}

impl MemoryRoleReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_members(self, role: RoleId, members: impl IntoIterator<Item = Address>) -> Self {
        self.set_members(role, members);
        self
    }

    pub fn set_members(&self, role: RoleId, members: impl IntoIterator<Item = Address>) {
        self.members
            .lock()
            .unwrap()
            .insert(role, members.into_iter().collect());
    }

    /// Make every read of `role` fail until [`MemoryRoleReader::recover`].
    pub fn fail_role(&self, role: RoleId) {
        self.failing.lock().unwrap().insert(role);
    }

    pub fn recover(&self, role: RoleId) {
        self.failing.lock().unwrap().remove(&role);
    }

    /// Hold every read started from now on until the returned gate is released.
    pub fn hold_reads(&self) -> ReadGate {
        let (tx, rx) = watch::channel(false);
        *self.hold.lock().unwrap() = Some(rx);
        ReadGate { tx }
    }

    /// Stop holding reads started after this call. Already-held reads stay held.
    pub fn clear_hold(&self) {
        *self.hold.lock().unwrap() = None;
    }

    /// Number of reads started so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    async fn wait_for_gate(&self) {
        let gate = self.hold.lock().unwrap().clone();
        if let Some(mut rx) = gate {
            let _ = rx.wait_for(|open| *open).await;
        }
    }
}

#[async_trait]
impl RoleReader for MemoryRoleReader {
    async fn read_role_members(&self, role: RoleId) -> QueryResult<Vec<Address>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        // Snapshot the answer at call time so held reads return what was
        // current when they started.
        let failing = self.failing.lock().unwrap().contains(&role);
        let members = self
            .members
            .lock()
            .unwrap()
            .get(&role)
            .cloned()
            .unwrap_or_default();

        self.wait_for_gate().await;

        if failing {
            return Err(QueryError::role_query(role, "node unavailable"));
        }
        Ok(members)
    }

    async fn has_role(&self, member: Address, role: RoleId) -> QueryResult<bool> {
        if self.failing.lock().unwrap().contains(&role) {
            return Err(QueryError::role_query(role, "node unavailable"));
        }
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(&role)
            .is_some_and(|m| m.contains(&member)))
    }
}

// ---------------------------------------------------------------------------
// RecordingProposer
// ---------------------------------------------------------------------------

/// Proposer that records every submitted batch.
#[derive(Debug, Default)]
pub struct RecordingProposer {
    batches: Mutex<Vec<Vec<TransactionRequest>>>,
}

impl RecordingProposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<Vec<TransactionRequest>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl MultisigProposer for RecordingProposer {
    async fn propose(&self, transactions: &[TransactionRequest]) -> ProposalResult<ProposalReceipt> {
        if transactions.is_empty() {
            return Err(ProposalError::EmptyBatch);
        }
        let mut batches = self.batches.lock().unwrap();
        batches.push(transactions.to_vec());
        Ok(ProposalReceipt {
            safe_tx_hash: B256::with_last_byte(batches.len() as u8),
            nonce: batches.len() as u64 - 1,
        })
    }
}
