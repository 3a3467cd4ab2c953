/// Result decoder for committed transactions
///
/// Turns a node's `TxResponse` into a `Tx`: structured event logs on success,
/// per-message return data, and the input messages replayed through the
/// message registry.

use prost::Message;
use serde::{Deserialize, Serialize};

use crate::chain::error::{Error, Result};
use crate::chain::messages::{MsgDecoderRegistry, TxMessage};
use crate::chain::proto::{AuthInfo, ProtoTx, TxMsgData, TxResponse};
use crate::chain::rpc::{split_query, ChainRpc};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// Events emitted by one message of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgLog {
    /// Older nodes omit it; filled with the log position while decoding.
    #[serde(default)]
    pub msg_index: Option<u32>,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// One flattened `(message, event, attribute)` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayLogEntry {
    pub msg: u32,
    #[serde(rename = "type")]
    pub event_type: String,
    pub key: String,
    pub value: String,
}

/// The transaction input as recorded on chain.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTx {
    pub messages: Vec<TxMessage>,
    pub memo: String,
    pub timeout_height: u64,
    pub auth_info: Option<AuthInfo>,
    pub signatures: Vec<Vec<u8>>,
}

/// A transaction located on chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Tx {
    pub height: i64,
    /// Upper-case hex hash; non-empty.
    pub transaction_hash: String,
    pub code: u32,
    pub codespace: String,
    /// Human readable error when `code != 0`.
    pub raw_log: String,
    pub json_log: Option<Vec<MsgLog>>,
    pub array_log: Option<Vec<ArrayLogEntry>>,
    /// Return value of each executed message.
    pub data: Vec<Vec<u8>>,
    pub tx: DecodedTx,
    pub tx_bytes: Vec<u8>,
    pub gas_used: i64,
    pub gas_wanted: i64,
    pub timestamp: String,
}

impl Tx {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Well-known meaning of `code`. Module codespaces number their errors
    /// independently, so only `sdk` (or an empty codespace) maps onto the table.
    pub fn result_code(&self) -> TxResultCode {
        TxResultCode::from_codespace(&self.codespace, self.code)
    }
}

/// Well-known ABCI result codes of the SDK root codespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxResultCode {
    Success,
    ErrInternal,
    ErrTxDecode,
    ErrInvalidSequence,
    ErrUnauthorized,
    ErrInsufficientFunds,
    ErrUnknownRequest,
    ErrInvalidAddress,
    ErrInvalidPubKey,
    ErrUnknownAddress,
    ErrInvalidCoins,
    ErrOutOfGas,
    ErrMemoTooLarge,
    ErrInsufficientFee,
    ErrTooManySignatures,
    ErrNoSignatures,
    ErrJsonMarshal,
    ErrJsonUnmarshal,
    ErrInvalidRequest,
    ErrTxInMempoolCache,
    ErrMempoolIsFull,
    ErrTxTooLarge,
    ErrKeyNotFound,
    ErrWrongPassword,
    ErrInvalidSigner,
    ErrInvalidGasAdjustment,
    ErrInvalidHeight,
    ErrInvalidVersion,
    ErrInvalidChainId,
    ErrInvalidType,
    ErrTxTimeoutHeight,
    ErrUnknownExtensionOptions,
    ErrWrongSequence,
    ErrPackAny,
    ErrUnpackAny,
    ErrLogic,
    ErrConflict,
    ErrNotSupported,
    ErrNotFound,
    ErrIo,
    ErrAppConfig,
    /// Recovered panic; details redacted by the node.
    ErrPanic,
    Other(u32),
}

impl TxResultCode {
    pub const ROOT_CODESPACE: &'static str = "sdk";

    const TABLE: [TxResultCode; 41] = [
        TxResultCode::Success,
        TxResultCode::ErrInternal,
        TxResultCode::ErrTxDecode,
        TxResultCode::ErrInvalidSequence,
        TxResultCode::ErrUnauthorized,
        TxResultCode::ErrInsufficientFunds,
        TxResultCode::ErrUnknownRequest,
        TxResultCode::ErrInvalidAddress,
        TxResultCode::ErrInvalidPubKey,
        TxResultCode::ErrUnknownAddress,
        TxResultCode::ErrInvalidCoins,
        TxResultCode::ErrOutOfGas,
        TxResultCode::ErrMemoTooLarge,
        TxResultCode::ErrInsufficientFee,
        TxResultCode::ErrTooManySignatures,
        TxResultCode::ErrNoSignatures,
        TxResultCode::ErrJsonMarshal,
        TxResultCode::ErrJsonUnmarshal,
        TxResultCode::ErrInvalidRequest,
        TxResultCode::ErrTxInMempoolCache,
        TxResultCode::ErrMempoolIsFull,
        TxResultCode::ErrTxTooLarge,
        TxResultCode::ErrKeyNotFound,
        TxResultCode::ErrWrongPassword,
        TxResultCode::ErrInvalidSigner,
        TxResultCode::ErrInvalidGasAdjustment,
        TxResultCode::ErrInvalidHeight,
        TxResultCode::ErrInvalidVersion,
        TxResultCode::ErrInvalidChainId,
        TxResultCode::ErrInvalidType,
        TxResultCode::ErrTxTimeoutHeight,
        TxResultCode::ErrUnknownExtensionOptions,
        TxResultCode::ErrWrongSequence,
        TxResultCode::ErrPackAny,
        TxResultCode::ErrUnpackAny,
        TxResultCode::ErrLogic,
        TxResultCode::ErrConflict,
        TxResultCode::ErrNotSupported,
        TxResultCode::ErrNotFound,
        TxResultCode::ErrIo,
        TxResultCode::ErrAppConfig,
    ];

    pub fn from_code(code: u32) -> Self {
        match code {
            111222 => TxResultCode::ErrPanic,
            n => Self::TABLE.get(n as usize).copied().unwrap_or(TxResultCode::Other(n)),
        }
    }

    /// Like [`TxResultCode::from_code`], but codes from a module codespace
    /// stay `Other`.
    pub fn from_codespace(codespace: &str, code: u32) -> Self {
        match codespace {
            _ if code == 0 => TxResultCode::Success,
            "" | Self::ROOT_CODESPACE => Self::from_code(code),
            _ => TxResultCode::Other(code),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            TxResultCode::ErrPanic => 111222,
            TxResultCode::Other(n) => *n,
            known => Self::TABLE.iter().position(|c| c == known).unwrap_or_default() as u32,
        }
    }
}

/// Parse a successful transaction's raw log. Entries missing `msg_index`
/// get their position; the flattened form indexes by position too.
pub fn parse_raw_log(raw_log: &str) -> Result<(Vec<MsgLog>, Vec<ArrayLogEntry>)> {
    let mut json_log: Vec<MsgLog> = serde_json::from_str(raw_log)?;
    let mut array_log = Vec::new();

    for (msg_index, log) in json_log.iter_mut().enumerate() {
        let msg_index = msg_index as u32;
        log.msg_index.get_or_insert(msg_index);

        for event in &log.events {
            for attr in &event.attributes {
                array_log.push(ArrayLogEntry {
                    msg: msg_index,
                    event_type: event.event_type.clone(),
                    key: attr.key.clone(),
                    value: attr.value.clone(),
                });
            }
        }
    }

    Ok((json_log, array_log))
}

fn decode_msg_data(hex_data: &str) -> Result<Vec<Vec<u8>>> {
    let tx_msg_data = TxMsgData::decode(hex::decode(hex_data)?.as_slice())?;
    if !tx_msg_data.data.is_empty() {
        return Ok(tx_msg_data.data.into_iter().map(|d| d.data).collect());
    }
    Ok(tx_msg_data.msg_responses.into_iter().map(|a| a.value).collect())
}

/// Decode a node's response for a committed transaction.
pub fn decode_tx_response(response: TxResponse, registry: &MsgDecoderRegistry) -> Result<Tx> {
    let (json_log, array_log) = if response.code == 0 && !response.raw_log.is_empty() {
        match parse_raw_log(&response.raw_log) {
            Ok((json, array)) => (Some(json), Some(array)),
            Err(e) => {
                log::warn!("Raw log of {} is not structured JSON: {}", response.txhash, e);
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    let data = decode_msg_data(&response.data)?;

    let tx_any = response
        .tx
        .ok_or_else(|| Error::MissingTx(response.txhash.clone()))?;
    let proto_tx = ProtoTx::decode(tx_any.value.as_slice())?;
    let body = proto_tx
        .body
        .ok_or_else(|| Error::MissingTx(response.txhash.clone()))?;

    let messages: Vec<TxMessage> = body.messages.iter().map(|m| registry.decode(m)).collect();
    log::debug!(
        "Decoded tx {} with {} message(s), {} opaque",
        response.txhash,
        messages.len(),
        messages.iter().filter(|m| m.is_opaque()).count()
    );

    Ok(Tx {
        height: response.height,
        transaction_hash: response.txhash,
        code: response.code,
        codespace: response.codespace,
        raw_log: response.raw_log,
        json_log,
        array_log,
        data,
        tx: DecodedTx {
            messages,
            memo: body.memo,
            timeout_height: body.timeout_height,
            auth_info: proto_tx.auth_info,
            signatures: proto_tx.signatures,
        },
        tx_bytes: tx_any.value,
        gas_used: response.gas_used,
        gas_wanted: response.gas_wanted,
        timestamp: response.timestamp,
    })
}

/// Run an event query (`key='value' AND ...`) and decode every hit.
pub async fn search_txs(rpc: &dyn ChainRpc, registry: &MsgDecoderRegistry, query: &str) -> Result<Vec<Tx>> {
    rpc.get_txs_event(split_query(query))
        .await?
        .into_iter()
        .map(|response| decode_tx_response(response, registry))
        .collect()
}

/// Locate a transaction by hash. `None` if the node has not indexed it yet.
pub async fn get_tx(rpc: &dyn ChainRpc, registry: &MsgDecoderRegistry, hash: &str) -> Result<Option<Tx>> {
    let mut results = search_txs(rpc, registry, &format!("tx.hash='{}'", hash)).await?;
    if results.is_empty() {
        return Ok(None);
    }
    Ok(Some(results.swap_remove(0)))
}
