//! Deployment configuration.
//!
//! Settings come from environment variables; the CLI layers its own flags on
//! top through `clap`'s `env` support.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::RolePreset;
use crate::proposal::{tx_service_url, MULTISEND_CALL_ONLY};

pub const ENV_RPC_URL: &str = "RPC_URL";
pub const ENV_CHAIN_ID: &str = "CHAIN_ID";
pub const ENV_INTERACTOR: &str = "DEFI_INTERACTOR_ADDRESS";
pub const ENV_SAFE: &str = "SAFE_ADDRESS";
pub const ENV_TX_SERVICE_URL: &str = "SAFE_TX_SERVICE_URL";
pub const ENV_MULTISEND: &str = "MULTISEND_ADDRESS";
pub const ENV_ROLES: &str = "ROLE_PRESET";

/// Errors raised while assembling an [`InteractorConfig`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Where the interactor lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractorConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub interactor: Address,
    /// Governing Safe; read from the contract when unset.
    pub safe: Option<Address>,
    /// Overrides the hosted service resolved from `chain_id`.
    pub tx_service_url: Option<String>,
    pub multisend: Address,
    pub roles: RolePreset,
}

impl InteractorConfig {
    pub fn new(rpc_url: impl Into<String>, chain_id: u64, interactor: Address) -> Self {
        InteractorConfig {
            rpc_url: rpc_url.into(),
            chain_id,
            interactor,
            safe: None,
            tx_service_url: None,
            multisend: MULTISEND_CALL_ONLY,
            roles: RolePreset::default(),
        }
    }

    /// Load from process environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());

        let rpc_url = get(ENV_RPC_URL).ok_or(ConfigError::Missing(ENV_RPC_URL))?;
        let chain_id = match get(ENV_CHAIN_ID) {
            Some(raw) => parse_chain_id(&raw)?,
            None => 1,
        };
        let interactor = get(ENV_INTERACTOR)
            .ok_or(ConfigError::Missing(ENV_INTERACTOR))
            .and_then(|raw| parse_address(ENV_INTERACTOR, &raw))?;

        let mut config = InteractorConfig::new(rpc_url, chain_id, interactor);
        if let Some(raw) = get(ENV_SAFE) {
            config.safe = Some(parse_address(ENV_SAFE, &raw)?);
        }
        if let Some(raw) = get(ENV_MULTISEND) {
            config.multisend = parse_address(ENV_MULTISEND, &raw)?;
        }
        if let Some(raw) = get(ENV_ROLES) {
            config.roles = parse_role_preset(&raw)?;
        }
        config.tx_service_url = get(ENV_TX_SERVICE_URL);

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot address a deployment.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.interactor == Address::ZERO {
            return Err(ConfigError::Invalid {
                name: ENV_INTERACTOR,
                reason: "zero address".to_string(),
            });
        }
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: ENV_RPC_URL,
                reason: format!("expected http(s) URL, got {}", self.rpc_url),
            });
        }
        Ok(())
    }

    /// Safe Transaction Service to propose through, if any is known.
    pub fn tx_service_base(&self) -> Option<String> {
        self.tx_service_url
            .clone()
            .or_else(|| tx_service_url(self.chain_id).map(str::to_string))
    }
}

pub fn parse_address(name: &'static str, raw: &str) -> ConfigResult<Address> {
    raw.trim().parse::<Address>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn parse_chain_id(raw: &str) -> ConfigResult<u64> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse::<u64>(),
    };
    parsed.map_err(|e| ConfigError::Invalid {
        name: ENV_CHAIN_ID,
        reason: e.to_string(),
    })
}

fn parse_role_preset(raw: &str) -> ConfigResult<RolePreset> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_ascii_lowercase())).map_err(
        |_| ConfigError::Invalid {
            name: ENV_ROLES,
            reason: format!("unknown role preset `{raw}`"),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const INTERACTOR: &str = "0x00000000000000000000000000000000000000d1";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = InteractorConfig::from_lookup(lookup(&[
            (ENV_RPC_URL, "http://localhost:8545"),
            (ENV_INTERACTOR, INTERACTOR),
        ]))
        .unwrap();
        assert_eq!(config.chain_id, 1);
        assert_eq!(config.safe, None);
        assert_eq!(config.multisend, MULTISEND_CALL_ONLY);
        assert_eq!(config.roles, RolePreset::DepositWithdraw);
        assert_eq!(
            config.tx_service_base().as_deref(),
            Some("https://safe-transaction-mainnet.safe.global")
        );
    }

    #[test]
    fn test_missing_interactor_is_reported() {
        let err = InteractorConfig::from_lookup(lookup(&[(ENV_RPC_URL, "http://localhost:8545")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_INTERACTOR));
    }

    #[test]
    fn test_placeholder_address_is_missing() {
        // Deployments ship with "0x" as the unset placeholder.
        let err = InteractorConfig::from_lookup(lookup(&[
            (ENV_RPC_URL, "http://localhost:8545"),
            (ENV_INTERACTOR, "0x"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: ENV_INTERACTOR, .. }));
    }

    #[test]
    fn test_full_config() {
        let config = InteractorConfig::from_lookup(lookup(&[
            (ENV_RPC_URL, "https://rpc.sepolia.org"),
            (ENV_CHAIN_ID, "0xaa36a7"),
            (ENV_INTERACTOR, INTERACTOR),
            (ENV_SAFE, "0x5afe00000000000000000000000000000000cafe"),
            (ENV_TX_SERVICE_URL, "http://localhost:8000"),
            (ENV_ROLES, "execute-transfer"),
        ]))
        .unwrap();
        assert_eq!(config.chain_id, 11155111);
        assert!(config.safe.is_some());
        assert_eq!(config.roles, RolePreset::ExecuteTransfer);
        assert_eq!(config.tx_service_base().as_deref(), Some("http://localhost:8000"));
    }

    #[test]
    fn test_unknown_chain_has_no_service() {
        let mut config =
            InteractorConfig::new("http://localhost:8545", 31337, INTERACTOR.parse().unwrap());
        assert_eq!(config.tx_service_base(), None);
        config.tx_service_url = Some("http://localhost:8000".into());
        assert!(config.tx_service_base().is_some());
    }

    #[test]
    fn test_non_http_rpc_url_is_invalid() {
        let err = InteractorConfig::from_lookup(lookup(&[
            (ENV_RPC_URL, "ws://localhost:8546"),
            (ENV_INTERACTOR, INTERACTOR),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: ENV_RPC_URL, .. }));
    }

    #[test]
    fn test_bad_role_preset() {
        let err = InteractorConfig::from_lookup(lookup(&[
            (ENV_RPC_URL, "http://localhost:8545"),
            (ENV_INTERACTOR, INTERACTOR),
            (ENV_ROLES, "admin"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: ENV_ROLES, .. }));
    }
}
