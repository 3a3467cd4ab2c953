use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::chain::broadcast::BroadcastMode;
use crate::chain::rpc::ClientConfig;
use crate::chain::tx_builder::TxOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub chain: ChainConfig,
    #[serde(default)]
    pub tx: TxDefaults,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub grpc_endpoint: String,
    pub chain_id: String,
    /// Bech32 prefix of account addresses
    pub address_prefix: String,
    /// Derive keys the Ethermint way (coin type 60, keccak addresses)
    #[serde(default = "default_true")]
    pub ethermint_keys: bool,
    // Note: the mnemonic is read from MERLION_MNEMONIC, never from this file
    pub address: String,
    pub connection_timeout: u64,
    pub request_timeout: u64,
    pub max_retries: u32,
}

/// Defaults applied to every transaction sent by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxDefaults {
    pub gas_limit: u64,
    pub gas_price_in_fee_denom: f64,
    pub fee_denom: String,
    pub memo: String,
    pub wait_for_commit: bool,
    pub broadcast_timeout_ms: u64,
    pub broadcast_check_interval_ms: u64,
    pub broadcast_mode: BroadcastMode,
}

fn default_true() -> bool {
    true
}

impl Default for TxDefaults {
    fn default() -> Self {
        let options = TxOptions::default();
        Self {
            gas_limit: options.gas_limit,
            gas_price_in_fee_denom: options.gas_price_in_fee_denom,
            fee_denom: options.fee_denom,
            memo: options.memo,
            wait_for_commit: options.wait_for_commit,
            broadcast_timeout_ms: options.broadcast_timeout_ms,
            broadcast_check_interval_ms: options.broadcast_check_interval_ms,
            broadcast_mode: options.broadcast_mode,
        }
    }
}

impl TxDefaults {
    pub fn to_options(&self) -> TxOptions {
        TxOptions {
            gas_limit: self.gas_limit,
            gas_price_in_fee_denom: self.gas_price_in_fee_denom,
            fee_denom: self.fee_denom.clone(),
            memo: self.memo.clone(),
            wait_for_commit: self.wait_for_commit,
            broadcast_timeout_ms: self.broadcast_timeout_ms,
            broadcast_check_interval_ms: self.broadcast_check_interval_ms,
            broadcast_mode: self.broadcast_mode,
            explicit_signer_data: None,
        }
    }
}

impl ChainConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            grpc_endpoint: self.grpc_endpoint.clone(),
            connection_timeout: self.connection_timeout,
            request_timeout: self.request_timeout,
            max_retries: self.max_retries,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            chain: ChainConfig {
                grpc_endpoint: client.grpc_endpoint,
                chain_id: "merlion_5000-101".to_string(),
                address_prefix: "mer".to_string(),
                ethermint_keys: true,
                address: String::new(),
                connection_timeout: client.connection_timeout,
                request_timeout: client.request_timeout,
                max_retries: client.max_retries,
            },
            tx: TxDefaults::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
