//! Network definition and externally supplied endpoints.
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Address, AddressExt, SHM_DECIMALS};

pub const RPC_URL_ENV: &str = "OPENTASK_RPC_URL";
pub const CONTRACT_ADDRESS_ENV: &str = "OPENTASK_CONTRACT_ADDRESS";
pub const DEFAULT_RPC_URL: &str = "https://dapps.shardeum.org/";

/// Shardeum Unstablenet, the network the task board contract is deployed on.
pub static SHARDEUM_NETWORK: Lazy<NetworkConfig> = Lazy::new(|| {
    NetworkConfig::shardeum(
        std::env::var(RPC_URL_ENV).unwrap_or_else(|_| DEFAULT_RPC_URL.to_string()),
    )
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

/// Everything a wallet needs to add the network when it does not know it yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    #[serde(skip)]
    pub chain_id: u64,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl NetworkConfig {
    pub fn shardeum(rpc_url: impl Into<String>) -> Self {
        Self {
            chain_id: 8081,
            chain_name: "Shardeum Unstablenet".to_string(),
            native_currency: NativeCurrency {
                name: "SHM".to_string(),
                symbol: "SHM".to_string(),
                decimals: SHM_DECIMALS,
            },
            rpc_urls: vec![rpc_url.into()],
            block_explorer_urls: vec!["https://explorer-dapps.shardeum.org/".to_string()],
        }
    }

    /// `0x1f91` style id wallets exchange in `wallet_switchEthereumChain`
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    pub fn explorer_tx_url(&self, tx: &str) -> Option<String> {
        self.block_explorer_urls
            .first()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    /// `None` is tolerated at load time; every contract call fails on it.
    pub contract_address: Option<Address>,
    pub network: NetworkConfig,
}

impl Config {
    pub fn new(rpc_url: impl Into<String>, contract_address: Option<Address>) -> Self {
        let rpc_url = rpc_url.into();
        Self {
            network: NetworkConfig::shardeum(rpc_url.clone()),
            rpc_url,
            contract_address,
        }
    }

    pub fn from_env() -> Result<Self> {
        let contract_address = match std::env::var(CONTRACT_ADDRESS_ENV) {
            Ok(raw) => parse_contract_address(&raw)?,
            Err(_) => None,
        };
        Ok(Self {
            rpc_url: SHARDEUM_NETWORK.rpc_urls[0].clone(),
            contract_address,
            network: SHARDEUM_NETWORK.clone(),
        })
    }

    /// Command-line values win over the environment. An empty contract
    /// string clears the configured address.
    pub fn with_overrides(mut self, rpc_url: Option<&str>, contract: Option<&str>) -> Result<Self> {
        if let Some(rpc_url) = rpc_url {
            self.network.rpc_urls = vec![rpc_url.to_string()];
            self.rpc_url = rpc_url.to_string();
        }
        if let Some(raw) = contract {
            self.contract_address = parse_contract_address(raw)?;
        }
        Ok(self)
    }

    pub fn contract_address(&self) -> Result<Address> {
        self.contract_address.ok_or(Error::MissingContractAddress)
    }
}

/// Empty input means "not configured".
pub fn parse_contract_address(raw: &str) -> Result<Option<Address>> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        Address::parse(raw).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shardeum() {
        let network = NetworkConfig::shardeum("http://localhost:8080");
        assert_eq!(network.chain_id_hex(), "0x1f91");
        assert_eq!(network.native_currency.decimals, 18);
        assert_eq!(
            network.explorer_tx_url("0xabc").unwrap(),
            "https://explorer-dapps.shardeum.org/tx/0xabc"
        );
    }

    #[test]
    fn test_contract_address() {
        let config = Config::new("http://localhost:8080", None);
        assert!(matches!(
            config.contract_address(),
            Err(Error::MissingContractAddress)
        ));

        assert_eq!(parse_contract_address("  ").unwrap(), None);
        assert!(parse_contract_address("0x12").is_err());
        let address = parse_contract_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed")
            .unwrap()
            .unwrap();
        assert_eq!(Config::new("x", Some(address)).contract_address().unwrap(), address);
    }

    #[test]
    fn test_overrides() {
        let address = parse_contract_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed")
            .unwrap()
            .unwrap();
        let base = Config::new(DEFAULT_RPC_URL, Some(address));

        let kept = base.clone().with_overrides(None, None).unwrap();
        assert_eq!(kept.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(kept.contract_address, Some(address));

        let moved = base
            .clone()
            .with_overrides(Some("http://localhost:8545"), Some(""))
            .unwrap();
        assert_eq!(moved.rpc_url, "http://localhost:8545");
        assert_eq!(moved.network.rpc_urls, vec!["http://localhost:8545".to_string()]);
        assert_eq!(moved.network.chain_id, 8081);
        assert_eq!(moved.contract_address, None);

        assert!(matches!(
            base.with_overrides(None, Some("0x12")),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_from_env_uses_shared_network() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.rpc_url, SHARDEUM_NETWORK.rpc_urls[0]);
        assert_eq!(config.network, *SHARDEUM_NETWORK);
    }
}
