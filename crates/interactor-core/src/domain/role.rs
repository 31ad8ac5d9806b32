//! Role identifiers and the role sets queried together.
//!
//! The contract stores roles as `uint16` ids. Two generations of the
//! interactor contract assign different meanings to the same ids, so the
//! human-facing metadata lives in [`RoleInfo`] and is grouped into a
//! [`RoleSet`] per contract generation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// On-chain role identifier (`uint16` in the contract ABI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(pub u16);

impl RoleId {
    pub const DEFI_DEPOSIT: RoleId = RoleId(1);
    pub const DEFI_WITHDRAW: RoleId = RoleId(2);
    pub const DEFI_EXECUTE: RoleId = RoleId(1);
    pub const DEFI_TRANSFER: RoleId = RoleId(2);

    pub fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for RoleId {
    fn from(id: u16) -> Self {
        RoleId(id)
    }
}

/// Display metadata for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleInfo {
    pub id: RoleId,
    pub name: &'static str,
    pub description: &'static str,
}

impl RoleInfo {
    pub const DEPOSIT: RoleInfo = RoleInfo {
        id: RoleId::DEFI_DEPOSIT,
        name: "Deposit",
        description: "Can deposit to Morpho Vaults (10% of balance per 24h)",
    };

    pub const WITHDRAW: RoleInfo = RoleInfo {
        id: RoleId::DEFI_WITHDRAW,
        name: "Withdraw",
        description: "Can withdraw from Morpho Vaults (5% of position per 24h)",
    };

    pub const EXECUTE: RoleInfo = RoleInfo {
        id: RoleId::DEFI_EXECUTE,
        name: "Execute",
        description: "Can execute whitelisted DeFi protocol calls through the Safe",
    };

    pub const TRANSFER: RoleInfo = RoleInfo {
        id: RoleId::DEFI_TRANSFER,
        name: "Transfer",
        description: "Can transfer tokens out of the Safe within the transfer window",
    };

    /// Placeholder metadata for an id no preset knows about.
    pub fn unnamed(id: RoleId) -> Self {
        RoleInfo {
            id,
            name: "Custom",
            description: "Role without registered metadata",
        }
    }
}

/// Named role sets matching the deployed contract generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RolePreset {
    #[default]
    DepositWithdraw,
    ExecuteTransfer,
}

impl RolePreset {
    pub fn roles(self) -> RoleSet {
        match self {
            RolePreset::DepositWithdraw => RoleSet::deposit_withdraw(),
            RolePreset::ExecuteTransfer => RoleSet::execute_transfer(),
        }
    }
}

/// Ordered, duplicate-free list of roles queried in one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleSet {
    roles: Vec<RoleInfo>,
}

impl RoleSet {
    /// Build a role set. Later entries with an id already present are dropped.
    pub fn new(roles: impl IntoIterator<Item = RoleInfo>) -> Self {
        let mut out: Vec<RoleInfo> = Vec::new();
        for role in roles {
            if !out.iter().any(|r| r.id == role.id) {
                out.push(role);
            }
        }
        RoleSet { roles: out }
    }

    pub fn deposit_withdraw() -> Self {
        Self::new([RoleInfo::DEPOSIT, RoleInfo::WITHDRAW])
    }

    pub fn execute_transfer() -> Self {
        Self::new([RoleInfo::EXECUTE, RoleInfo::TRANSFER])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoleInfo> {
        self.roles.iter()
    }

    pub fn ids(&self) -> Vec<RoleId> {
        self.roles.iter().map(|r| r.id).collect()
    }

    pub fn get(&self, id: RoleId) -> Option<&RoleInfo> {
        self.roles.iter().find(|r| r.id == id)
    }

    /// Metadata for `id`, falling back to [`RoleInfo::unnamed`].
    pub fn info(&self, id: RoleId) -> RoleInfo {
        self.get(id).copied().unwrap_or_else(|| RoleInfo::unnamed(id))
    }

    /// Resolve a role by case-insensitive name or by numeric id.
    pub fn resolve(&self, name_or_id: &str) -> Option<RoleId> {
        let needle = name_or_id.trim();
        if let Ok(id) = needle.parse::<u16>() {
            return Some(RoleId(id));
        }
        self.roles
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(needle))
            .map(|r| r.id)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_set_drops_duplicate_ids() {
        let set = RoleSet::new([RoleInfo::DEPOSIT, RoleInfo::EXECUTE, RoleInfo::WITHDRAW]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.ids(), vec![RoleId(1), RoleId(2)]);
        assert_eq!(set.info(RoleId(1)).name, "Deposit");
    }

    #[test]
    fn test_resolve_by_name_or_number() {
        let set = RoleSet::deposit_withdraw();
        assert_eq!(set.resolve("withdraw"), Some(RoleId::DEFI_WITHDRAW));
        assert_eq!(set.resolve("DEPOSIT"), Some(RoleId::DEFI_DEPOSIT));
        assert_eq!(set.resolve("7"), Some(RoleId(7)));
        assert_eq!(set.resolve("transfer"), None);
    }

    #[test]
    fn test_unknown_id_gets_placeholder_info() {
        let set = RolePreset::ExecuteTransfer.roles();
        assert_eq!(set.info(RoleId(9)).name, "Custom");
        assert_eq!(set.info(RoleId(2)).name, "Transfer");
    }

    #[test]
    fn test_preset_serializes_kebab_case() {
        let json = serde_json::to_string(&RolePreset::ExecuteTransfer).unwrap();
        assert_eq!(json, "\"execute-transfer\"");
    }
}
