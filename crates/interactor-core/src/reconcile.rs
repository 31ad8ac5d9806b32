//! Account/role reconciliation.
//!
//! Role membership is read one role at a time, so the contract hands back one
//! address list per role. This module folds those lists into a single
//! [`ManagedAccount`] per address.

use alloy_primitives::Address;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::{ManagedAccount, RoleId};

/// Addresses currently holding `role`, as returned by one role read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMembers {
    pub role: RoleId,
    pub members: Vec<Address>,
}

impl RoleMembers {
    pub fn new(role: RoleId, members: impl IntoIterator<Item = Address>) -> Self {
        RoleMembers {
            role,
            members: members.into_iter().collect(),
        }
    }
}

/// Merge per-role member lists into one entry per address.
///
/// Every entry carries a flag for each role in `lists`. Output follows
/// insertion order: members of the first list in their given order, then
/// addresses first seen in later lists. Addresses compare on their raw
/// bytes, so hex letter case never produces duplicates.
pub fn reconcile_roles(lists: &[RoleMembers]) -> Vec<ManagedAccount> {
    let queried: Vec<RoleId> = lists.iter().map(|l| l.role).collect();
    let mut accounts: IndexMap<Address, ManagedAccount> = IndexMap::new();

    for list in lists {
        for address in &list.members {
            accounts
                .entry(*address)
                .or_insert_with(|| ManagedAccount::without_roles(*address, &queried))
                .grant(list.role);
        }
    }

    accounts.into_values().collect()
}

/// Two-role form of [`reconcile_roles`].
pub fn reconcile(role_a: RoleMembers, role_b: RoleMembers) -> Vec<ManagedAccount> {
    reconcile_roles(&[role_a, role_b])
}
