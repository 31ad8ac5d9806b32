//! Structured observability hooks for query and proposal lifecycles.
//!
//! Events are emitted at `info!` level (`warn!` for failures) with a stable
//! `event` field so log pipelines can filter on it.

use alloy_primitives::{Address, B256};
use tracing::{info, warn};

use crate::domain::QueryError;

/// Span tagged with the interactor address. Attach it to futures with
/// `tracing::Instrument::instrument` rather than entering it across awaits.
pub fn interactor_span(interactor: Address, chain_id: u64) -> tracing::Span {
    tracing::info_span!("interactor", interactor = %interactor, chain_id = chain_id)
}

pub fn emit_accounts_query_started(generation: u64, roles: usize) {
    info!(event = "accounts.query_started", generation = generation, roles = roles);
}

pub fn emit_accounts_query_committed(generation: u64, accounts: usize, duration_ms: u64) {
    info!(
        event = "accounts.query_committed",
        generation = generation,
        accounts = accounts,
        duration_ms = duration_ms,
    );
}

pub fn emit_accounts_query_failed(generation: u64, error: &QueryError) {
    warn!(event = "accounts.query_failed", generation = generation, error = %error);
}

/// An invocation was dropped before it finished.
pub fn emit_accounts_query_cancelled(generation: u64) {
    info!(event = "accounts.query_cancelled", generation = generation);
}

/// A finished invocation lost the race to a newer one.
pub fn emit_accounts_query_superseded(generation: u64, current: u64) {
    info!(
        event = "accounts.query_superseded",
        generation = generation,
        current = current,
    );
}

pub fn emit_proposal_submitted(safe: Address, safe_tx_hash: B256, nonce: u64, transactions: usize) {
    info!(
        event = "proposal.submitted",
        safe = %safe,
        safe_tx_hash = %safe_tx_hash,
        nonce = nonce,
        transactions = transactions,
    );
}

pub fn emit_proposal_failed(safe: Address, error: &dyn std::fmt::Display) {
    warn!(event = "proposal.failed", safe = %safe, error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RoleId;

    #[test]
    fn test_emitters_do_not_panic_without_subscriber() {
        emit_accounts_query_started(1, 2);
        emit_accounts_query_committed(1, 3, 10);
        emit_accounts_query_failed(2, &QueryError::role_query(RoleId(1), "boom"));
        emit_accounts_query_superseded(1, 2);
        emit_accounts_query_cancelled(3);
        emit_proposal_submitted(Address::ZERO, B256::ZERO, 0, 1);
        emit_proposal_failed(Address::ZERO, &"http 500");
    }

    #[test]
    fn test_interactor_span_create() {
        let span = interactor_span(Address::ZERO, 1);
        let _entered = span.enter();
    }
}
