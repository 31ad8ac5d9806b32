//! Permissions of a single address and contract status.

use alloy_primitives::Address;
use futures::future::try_join_all;
use serde::Serialize;
use tracing::instrument;

use crate::domain::{QueryResult, RoleInfo, RoleSet};
use crate::interactor::{DefiInteractor, RoleReader};

/// One role and whether the member holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolePermission {
    pub role: RoleInfo,
    pub held: bool,
}

/// Roles held by one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permissions {
    pub member: Address,
    pub roles: Vec<RolePermission>,
}

impl Permissions {
    pub fn has_any_role(&self) -> bool {
        self.roles.iter().any(|r| r.held)
    }

    pub fn held(&self) -> impl Iterator<Item = &RoleInfo> {
        self.roles.iter().filter(|r| r.held).map(|r| &r.role)
    }
}

/// Check every role in `roles` for `member` concurrently.
#[instrument(skip(reader, roles), fields(member = %member))]
pub async fn check_permissions(
    reader: &dyn RoleReader,
    member: Address,
    roles: &RoleSet,
) -> QueryResult<Permissions> {
    let checks = roles.iter().map(|info| async move {
        let held = reader.has_role(member, info.id).await?;
        Ok::<_, crate::domain::QueryError>(RolePermission { role: *info, held })
    });
    let roles = try_join_all(checks).await?;
    Ok(Permissions { member, roles })
}

/// Whether the connected address is the Safe governing the interactor.
///
/// Both must be known; the comparison is on raw address bytes.
pub fn is_safe_owner(connected: Option<Address>, safe: Option<Address>) -> bool {
    matches!((connected, safe), (Some(c), Some(s)) if c == s)
}

/// Snapshot of the interactor's governance state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractStatus {
    pub interactor: Address,
    pub safe: Address,
    pub paused: bool,
    /// `None` when no connected address was supplied.
    pub connected_is_safe_owner: Option<bool>,
}

/// Read the Safe address and pause flag concurrently.
pub async fn read_status(
    interactor: &DefiInteractor,
    connected: Option<Address>,
) -> QueryResult<ContractStatus> {
    let (safe, paused) = futures::try_join!(interactor.safe(), interactor.paused())?;
    Ok(ContractStatus {
        interactor: interactor.address(),
        safe,
        paused,
        connected_is_safe_owner: connected.map(|c| is_safe_owner(Some(c), Some(safe))),
    })
}
