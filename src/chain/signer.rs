/// Signer abstraction
///
/// A wallet can sign either the legacy amino JSON document or the protobuf
/// `SignDoc`, never both through the same handle. `OfflineSigner` carries the
/// capability as an explicit variant so every signing call site matches on it.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::error::{Error, Result};
use crate::chain::messages::{AminoMsg, Coin};
use crate::chain::proto::SignDoc;
use crate::chain::pub_key::{PubKey, SinglePubKey};

/// Key algorithm of a signer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algo {
    Secp256k1,
    EthSecp256k1,
    Ed25519,
}

/// An account exposed by a signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountData {
    pub address: String,
    pub algo: Algo,
    /// Compressed public key bytes.
    pub pubkey: Vec<u8>,
}

impl AccountData {
    /// Tagged public key matching the account's algorithm.
    pub fn pub_key(&self) -> Result<PubKey> {
        let single = match self.algo {
            Algo::Secp256k1 => SinglePubKey::secp256k1(&self.pubkey)?,
            Algo::EthSecp256k1 => SinglePubKey::eth_secp256k1(&self.pubkey)?,
            Algo::Ed25519 => SinglePubKey::ed25519(&self.pubkey)?,
        };
        Ok(PubKey::Single(single))
    }
}

/// Fee as it appears in amino sign documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdFee {
    pub amount: Vec<Coin>,
    pub gas: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granter: Option<String>,
}

/// The legacy JSON document signed in amino mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StdSignDoc {
    pub chain_id: String,
    pub account_number: String,
    pub sequence: String,
    pub fee: StdFee,
    pub msgs: Vec<AminoMsg>,
    pub memo: String,
}

impl StdSignDoc {
    /// Canonical bytes to sign: sorted keys, no whitespace, HTML-escaped.
    pub fn sign_bytes(&self) -> Result<Vec<u8>> {
        let value = sort_json(serde_json::to_value(self)?);
        let json = serde_json::to_string(&value)?;
        Ok(json
            .replace('&', "\\u0026")
            .replace('<', "\\u003c")
            .replace('>', "\\u003e")
            .into_bytes())
    }
}

fn sort_json(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_json(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_json).collect()),
        other => other,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StdSignature {
    pub pub_key: PubKey,
    /// Base64 encoded signature bytes.
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AminoSignResponse {
    /// The document that was actually signed; may differ from the request.
    pub signed: StdSignDoc,
    pub signature: StdSignature,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectSignResponse {
    /// The document that was actually signed; may differ from the request.
    pub signed: SignDoc,
    pub signature: StdSignature,
}

#[async_trait]
pub trait AminoSigner: Send + Sync {
    async fn get_accounts(&self) -> Result<Vec<AccountData>>;

    async fn sign_amino(&self, signer_address: &str, sign_doc: StdSignDoc) -> Result<AminoSignResponse>;
}

#[async_trait]
pub trait DirectSigner: Send + Sync {
    async fn get_accounts(&self) -> Result<Vec<AccountData>>;

    async fn sign_direct(&self, signer_address: &str, sign_doc: SignDoc) -> Result<DirectSignResponse>;
}

/// The signing capability a client holds.
#[derive(Clone)]
pub enum OfflineSigner {
    Amino(Arc<dyn AminoSigner>),
    Direct(Arc<dyn DirectSigner>),
    /// Query-only client; every signing operation fails.
    Readonly,
}

impl OfflineSigner {
    pub fn amino(signer: impl AminoSigner + 'static) -> Self {
        OfflineSigner::Amino(Arc::new(signer))
    }

    pub fn direct(signer: impl DirectSigner + 'static) -> Self {
        OfflineSigner::Direct(Arc::new(signer))
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, OfflineSigner::Direct(_))
    }

    pub fn is_readonly(&self) -> bool {
        matches!(self, OfflineSigner::Readonly)
    }

    pub async fn get_accounts(&self) -> Result<Vec<AccountData>> {
        match self {
            OfflineSigner::Amino(signer) => signer.get_accounts().await,
            OfflineSigner::Direct(signer) => signer.get_accounts().await,
            OfflineSigner::Readonly => Err(Error::ReadonlyModeUnsupported("get_accounts")),
        }
    }

    pub async fn sign_amino(&self, signer_address: &str, sign_doc: StdSignDoc) -> Result<AminoSignResponse> {
        match self {
            OfflineSigner::Amino(signer) => signer.sign_amino(signer_address, sign_doc).await,
            OfflineSigner::Direct(_) => Err(Error::WrongSignerType("AminoSigner")),
            OfflineSigner::Readonly => Err(Error::ReadonlyModeUnsupported("sign_amino")),
        }
    }

    pub async fn sign_direct(&self, signer_address: &str, sign_doc: SignDoc) -> Result<DirectSignResponse> {
        match self {
            OfflineSigner::Direct(signer) => signer.sign_direct(signer_address, sign_doc).await,
            OfflineSigner::Amino(_) | OfflineSigner::Readonly => Err(Error::WrongSignerType("DirectSigner")),
        }
    }
}

impl Default for OfflineSigner {
    fn default() -> Self {
        OfflineSigner::Readonly
    }
}

impl std::fmt::Debug for OfflineSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OfflineSigner::Amino(_) => f.write_str("OfflineSigner::Amino"),
            OfflineSigner::Direct(_) => f.write_str("OfflineSigner::Direct"),
            OfflineSigner::Readonly => f.write_str("OfflineSigner::Readonly"),
        }
    }
}
