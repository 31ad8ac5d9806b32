//! Per-address role summary produced by reconciliation.

use alloy_primitives::Address;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::role::RoleId;

/// An account together with one flag per queried role.
///
/// Only produced by [`crate::reconcile`]; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedAccount {
    pub address: Address,
    /// Flags keyed by role id, in the order the roles were queried.
    pub roles: IndexMap<RoleId, bool>,
}

impl ManagedAccount {
    /// New account with every role in `queried` set to `false`.
    pub fn without_roles(address: Address, queried: &[RoleId]) -> Self {
        ManagedAccount {
            address,
            roles: queried.iter().map(|id| (*id, false)).collect(),
        }
    }

    pub fn has_role(&self, role: RoleId) -> bool {
        self.roles.get(&role).copied().unwrap_or(false)
    }

    /// Role ids whose flag is set, in query order.
    pub fn held_roles(&self) -> Vec<RoleId> {
        self.roles
            .iter()
            .filter(|(_, held)| **held)
            .map(|(id, _)| *id)
            .collect()
    }

    pub(crate) fn grant(&mut self, role: RoleId) {
        self.roles.insert(role, true);
    }
}
