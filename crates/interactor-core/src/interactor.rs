//! Typed reads against a deployed DeFi Interactor.

use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::instrument;

use crate::contract::IDefiInteractor;
use crate::domain::{QueryError, QueryResult, RoleId};
use crate::rpc::{call_contract, ContractReader};

/// Role membership reads needed by reconciliation and permission checks.
#[async_trait]
pub trait RoleReader: Send + Sync {
    /// All addresses currently holding `role`.
    async fn read_role_members(&self, role: RoleId) -> QueryResult<Vec<Address>>;

    /// Whether `member` currently holds `role`.
    async fn has_role(&self, member: Address, role: RoleId) -> QueryResult<bool>;
}

/// Handle on one interactor deployment.
#[derive(Clone)]
pub struct DefiInteractor {
    address: Address,
    reader: Arc<dyn ContractReader>,
}

impl DefiInteractor {
    pub fn new(address: Address, reader: Arc<dyn ContractReader>) -> Self {
        DefiInteractor { address, reader }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Whether the emergency pause is active.
    pub async fn paused(&self) -> QueryResult<bool> {
        call_contract(
            self.reader.as_ref(),
            self.address,
            &IDefiInteractor::pausedCall {},
        )
        .await
        .map_err(|e| QueryError::read("paused", e))
    }

    /// Address of the Safe that governs this interactor.
    pub async fn safe(&self) -> QueryResult<Address> {
        call_contract(
            self.reader.as_ref(),
            self.address,
            &IDefiInteractor::safeCall {},
        )
        .await
        .map_err(|e| QueryError::read("safe", e))
    }

    /// Role ids as published by the contract's `DEFI_*_ROLE` getters.
    pub async fn published_role_ids(&self) -> QueryResult<(RoleId, RoleId)> {
        let reader = self.reader.as_ref();
        let (deposit, withdraw) = futures::try_join!(
            async {
                call_contract(reader, self.address, &IDefiInteractor::DEFI_DEPOSIT_ROLECall {})
                    .await
                    .map_err(|e| QueryError::read("DEFI_DEPOSIT_ROLE", e))
            },
            async {
                call_contract(reader, self.address, &IDefiInteractor::DEFI_WITHDRAW_ROLECall {})
                    .await
                    .map_err(|e| QueryError::read("DEFI_WITHDRAW_ROLE", e))
            },
        )?;
        Ok((RoleId(deposit), RoleId(withdraw)))
    }
}

#[async_trait]
impl RoleReader for DefiInteractor {
    #[instrument(skip(self), fields(interactor = %self.address, role = %role))]
    async fn read_role_members(&self, role: RoleId) -> QueryResult<Vec<Address>> {
        call_contract(
            self.reader.as_ref(),
            self.address,
            &IDefiInteractor::getSubaccountsByRoleCall { roleId: role.0 },
        )
        .await
        .map_err(|e| QueryError::role_query(role, e))
    }

    async fn has_role(&self, member: Address, role: RoleId) -> QueryResult<bool> {
        call_contract(
            self.reader.as_ref(),
            self.address,
            &IDefiInteractor::hasRoleCall {
                member,
                roleId: role.0,
            },
        )
        .await
        .map_err(|e| QueryError::role_query(role, e))
    }
}
