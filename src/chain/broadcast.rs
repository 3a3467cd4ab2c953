use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tokio::time::Instant;

use crate::chain::error::{Error, Result};
use crate::chain::messages::MsgDecoderRegistry;
use crate::chain::proto::ProtoBroadcastMode;
use crate::chain::rpc::ChainRpc;
use crate::chain::tx_builder::TxOptions;
use crate::chain::tx_result::{get_tx, Tx};

/// How a signed transaction is handed to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BroadcastMode {
    /// Wait for the mempool admission check before returning the hash.
    #[default]
    Sync,
    /// Return right after the send, no admission guarantee.
    Async,
}

impl BroadcastMode {
    pub fn as_proto(&self) -> ProtoBroadcastMode {
        match self {
            BroadcastMode::Sync => ProtoBroadcastMode::Sync,
            BroadcastMode::Async => ProtoBroadcastMode::Async,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BroadcastMode::Sync => "sync",
            BroadcastMode::Async => "async",
        }
    }
}

impl FromStr for BroadcastMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sync" => Ok(BroadcastMode::Sync),
            "async" => Ok(BroadcastMode::Async),
            _ => Err(Error::UnknownBroadcastMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for BroadcastMode {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<BroadcastMode> for String {
    fn from(mode: BroadcastMode) -> Self {
        mode.as_str().to_string()
    }
}

impl std::fmt::Display for BroadcastMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a broadcast.
#[derive(Debug, Clone, PartialEq)]
pub enum BroadcastResult {
    /// Submitted without waiting for a commit; poll with `get_tx`.
    Pending { tx_hash: String },
    Committed(Tx),
}

impl BroadcastResult {
    pub fn tx_hash(&self) -> &str {
        match self {
            BroadcastResult::Pending { tx_hash } => tx_hash,
            BroadcastResult::Committed(tx) => &tx.transaction_hash,
        }
    }

    pub fn committed(self) -> Option<Tx> {
        match self {
            BroadcastResult::Committed(tx) => Some(tx),
            BroadcastResult::Pending { .. } => None,
        }
    }
}

/// Hand signed bytes to the node and return the transaction hash.
/// Never retried.
pub async fn submit(rpc: &dyn ChainRpc, tx_bytes: Vec<u8>, mode: BroadcastMode) -> Result<String> {
    let response = rpc
        .broadcast_tx(tx_bytes, mode)
        .await?
        .ok_or(Error::MissingTxResponse)?;

    if mode == BroadcastMode::Sync && response.code != 0 {
        log::warn!(
            "Transaction rejected at admission: code {} ({}): {}",
            response.code,
            response.codespace,
            response.raw_log
        );
        return Err(Error::BroadcastRejected {
            code: response.code,
            codespace: response.codespace,
            raw_log: response.raw_log,
        });
    }

    log::info!("Submitted transaction {} ({})", response.txhash, mode);
    Ok(response.txhash)
}

/// Poll until the transaction is indexed or `timeout` has elapsed.
/// Sleeps `check_interval` before every lookup, the first included.
pub async fn wait_for_commit(
    rpc: &dyn ChainRpc,
    registry: &MsgDecoderRegistry,
    tx_hash: &str,
    timeout: Duration,
    check_interval: Duration,
) -> Result<Tx> {
    wait_for_commit_since(rpc, registry, tx_hash, Instant::now(), timeout, check_interval).await
}

/// Like [`wait_for_commit`], with the deadline counted from `start`.
pub async fn wait_for_commit_since(
    rpc: &dyn ChainRpc,
    registry: &MsgDecoderRegistry,
    tx_hash: &str,
    start: Instant,
    timeout: Duration,
    check_interval: Duration,
) -> Result<Tx> {
    loop {
        tokio::time::sleep(check_interval).await;

        if let Some(tx) = get_tx(rpc, registry, tx_hash).await? {
            log::info!("Transaction {} committed at height {} with code {}", tx_hash, tx.height, tx.code);
            return Ok(tx);
        }

        if start.elapsed() > timeout {
            return Err(Error::ConfirmationTimeout {
                tx_hash: tx_hash.to_string(),
            });
        }
        log::debug!("Transaction {} not found yet", tx_hash);
    }
}

/// Submit signed bytes and, if requested, wait for the commit.
/// `broadcast_timeout_ms` covers the submission as well as the polling.
pub async fn broadcast_signed(
    rpc: &dyn ChainRpc,
    registry: &MsgDecoderRegistry,
    tx_bytes: Vec<u8>,
    options: &TxOptions,
) -> Result<BroadcastResult> {
    let start = Instant::now();
    let tx_hash = submit(rpc, tx_bytes, options.broadcast_mode).await?;

    if !options.wait_for_commit {
        return Ok(BroadcastResult::Pending { tx_hash });
    }

    let tx = wait_for_commit_since(
        rpc,
        registry,
        &tx_hash,
        start,
        Duration::from_millis(options.broadcast_timeout_ms),
        Duration::from_millis(options.broadcast_check_interval_ms),
    )
    .await?;
    Ok(BroadcastResult::Committed(tx))
}
