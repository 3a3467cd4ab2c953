/// Message decoder registry
///
/// Maps a message type URL to a decoder that turns the message bytes embedded
/// in a committed transaction back into a typed value. The registry is built
/// once and never mutated afterwards; lookups are safe from any thread.

use std::collections::HashMap;
use std::sync::OnceLock;

use prost::Message;

use crate::chain::proto::{self, type_url, Any};

/// A message re-decoded from a committed transaction body.
#[derive(Debug, Clone, PartialEq)]
pub enum TxMessage {
    Send(proto::MsgSend),
    MultiSend(proto::MsgMultiSend),
    Grant(proto::MsgGrant),
    Delegate(proto::MsgDelegate),
    Undelegate(proto::MsgUndelegate),
    BeginRedelegate(proto::MsgBeginRedelegate),
    CreateValidator(proto::MsgCreateValidator),
    EditValidator(proto::MsgEditValidator),
    /// No decoder registered (or decoding failed); the original envelope.
    Opaque(Any),
}

impl TxMessage {
    pub fn is_opaque(&self) -> bool {
        matches!(self, TxMessage::Opaque(_))
    }
}

pub type MsgDecoder = fn(&[u8]) -> Result<TxMessage, prost::DecodeError>;

/// Mutable stage of the registry; `build` freezes it.
#[derive(Default)]
pub struct RegistryBuilder {
    decoders: HashMap<String, MsgDecoder>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, type_url: &str, decoder: MsgDecoder) -> Self {
        self.decoders.insert(type_url.to_string(), decoder);
        self
    }

    pub fn build(self) -> MsgDecoderRegistry {
        MsgDecoderRegistry {
            decoders: self.decoders,
        }
    }
}

/// Frozen type URL -> decoder table.
#[derive(Clone)]
pub struct MsgDecoderRegistry {
    decoders: HashMap<String, MsgDecoder>,
}

static GLOBAL_REGISTRY: OnceLock<MsgDecoderRegistry> = OnceLock::new();

impl MsgDecoderRegistry {
    /// Registry with every message type this SDK knows about.
    pub fn standard() -> Self {
        RegistryBuilder::new()
            .register(type_url::MSG_SEND, |b| proto::MsgSend::decode(b).map(TxMessage::Send))
            .register(type_url::MSG_MULTI_SEND, |b| {
                proto::MsgMultiSend::decode(b).map(TxMessage::MultiSend)
            })
            .register(type_url::MSG_GRANT, |b| proto::MsgGrant::decode(b).map(TxMessage::Grant))
            .register(type_url::MSG_DELEGATE, |b| {
                proto::MsgDelegate::decode(b).map(TxMessage::Delegate)
            })
            .register(type_url::MSG_UNDELEGATE, |b| {
                proto::MsgUndelegate::decode(b).map(TxMessage::Undelegate)
            })
            .register(type_url::MSG_BEGIN_REDELEGATE, |b| {
                proto::MsgBeginRedelegate::decode(b).map(TxMessage::BeginRedelegate)
            })
            .register(type_url::MSG_CREATE_VALIDATOR, |b| {
                proto::MsgCreateValidator::decode(b).map(TxMessage::CreateValidator)
            })
            .register(type_url::MSG_EDIT_VALIDATOR, |b| {
                proto::MsgEditValidator::decode(b).map(TxMessage::EditValidator)
            })
            .build()
    }

    /// Process-wide standard registry, initialised on first use.
    pub fn global() -> &'static MsgDecoderRegistry {
        GLOBAL_REGISTRY.get_or_init(MsgDecoderRegistry::standard)
    }

    pub fn lookup(&self, type_url: &str) -> Option<MsgDecoder> {
        self.decoders.get(type_url).copied()
    }

    pub fn contains(&self, type_url: &str) -> bool {
        self.decoders.contains_key(type_url)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Best-effort decode: unknown or malformed messages stay opaque.
    pub fn decode(&self, any: &Any) -> TxMessage {
        let Some(decoder) = self.lookup(&any.type_url) else {
            log::debug!("No decoder registered for {}, leaving message opaque", any.type_url);
            return TxMessage::Opaque(any.clone());
        };
        match decoder(&any.value) {
            Ok(msg) => msg,
            Err(e) => {
                log::warn!("Failed to decode {} message: {}", any.type_url, e);
                TxMessage::Opaque(any.clone())
            }
        }
    }
}

impl std::fmt::Debug for MsgDecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut urls: Vec<_> = self.decoders.keys().collect();
        urls.sort();
        f.debug_struct("MsgDecoderRegistry").field("type_urls", &urls).finish()
    }
}
