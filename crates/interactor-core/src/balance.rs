//! Native-token balance of a wallet on the configured network.

use alloy_primitives::{Address, U256};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::{QueryError, QueryResult};
use crate::rpc::AccountReader;

/// Decimal places shown for a balance.
pub const BALANCE_DECIMALS: u32 = 4;

/// Network display name and native symbol for the chains the interactor
/// ships with.
pub fn network_info(chain_id: u64) -> Option<(&'static str, &'static str)> {
    match chain_id {
        1 => Some(("Ethereum", "ETH")),
        10 => Some(("OP Mainnet", "ETH")),
        137 => Some(("Polygon", "POL")),
        8453 => Some(("Base", "ETH")),
        42161 => Some(("Arbitrum One", "ETH")),
        11155111 => Some(("Sepolia", "ETH")),
        _ => None,
    }
}

/// Render `wei` as ether with exactly `decimals` fractional digits, rounding
/// half up.
pub fn format_ether_fixed(wei: U256, decimals: u32) -> String {
    let decimals = decimals.min(18);
    let unit = U256::from(10u64).pow(U256::from(18 - decimals));
    let scaled = wei.saturating_add(unit / U256::from(2u64)) / unit;
    if decimals == 0 {
        return scaled.to_string();
    }
    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = scaled / divisor;
    let frac = (scaled % divisor).as_limbs()[0];
    format!("{whole}.{frac:0width$}", width = decimals as usize)
}

/// `0x1234...abcd`
pub fn short_address(address: Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// A wallet's native balance as read from the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletBalance {
    pub address: Address,
    pub chain_id: u64,
    pub network: String,
    pub symbol: String,
    pub wei: U256,
    pub formatted: String,
}

impl std::fmt::Display for WalletBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.formatted, self.symbol)
    }
}

/// Read the chain id and `address`'s balance concurrently.
#[instrument(skip(reader), fields(address = %address))]
pub async fn read_wallet_balance(
    reader: &dyn AccountReader,
    address: Address,
) -> QueryResult<WalletBalance> {
    let (chain_id, wei) = futures::try_join!(
        async {
            reader
                .chain_id()
                .await
                .map_err(|e| QueryError::read("eth_chainId", e))
        },
        async {
            reader
                .balance(address)
                .await
                .map_err(|e| QueryError::read("eth_getBalance", e))
        },
    )?;

    let (network, symbol) = network_info(chain_id).unwrap_or(("Unknown", "ETH"));
    debug!(chain_id, %wei, "balance read");
    Ok(WalletBalance {
        address,
        chain_id,
        network: network.to_string(),
        symbol: symbol.to_string(),
        wei,
        formatted: format_ether_fixed(wei, BALANCE_DECIMALS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn ether(whole: u64, wei: u64) -> U256 {
        U256::from(whole) * U256::from(10u64).pow(U256::from(18u64)) + U256::from(wei)
    }

    #[test]
    fn test_format_rounds_to_four_places() {
        assert_eq!(format_ether_fixed(U256::ZERO, 4), "0.0000");
        assert_eq!(format_ether_fixed(ether(1, 0), 4), "1.0000");
        assert_eq!(format_ether_fixed(ether(2, 500_000_000_000_000_000), 4), "2.5000");
        // 0.00004999.. rounds down, 0.00005 rounds up
        assert_eq!(format_ether_fixed(U256::from(49_999_999_999_999u64), 4), "0.0000");
        assert_eq!(format_ether_fixed(U256::from(50_000_000_000_000u64), 4), "0.0001");
        assert_eq!(format_ether_fixed(ether(0, 999_960_000_000_000_000), 4), "1.0000");
    }

    #[test]
    fn test_format_handles_extremes() {
        assert_eq!(format_ether_fixed(ether(3, 0), 0), "3");
        assert!(format_ether_fixed(U256::MAX, 4).contains('.'));
    }

    #[test]
    fn test_network_info() {
        assert_eq!(network_info(137), Some(("Polygon", "POL")));
        assert_eq!(network_info(11155111), Some(("Sepolia", "ETH")));
        assert_eq!(network_info(31337), None);
    }

    #[test]
    fn test_short_address() {
        let addr = address!("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert_eq!(short_address(addr), "0x5aAe...eAed");
    }
}
