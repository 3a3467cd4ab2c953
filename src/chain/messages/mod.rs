mod bank;
mod staking;
pub mod registry;

pub use bank::{MsgMultiSend, MsgSend, Transfer};
pub use registry::{MsgDecoder, MsgDecoderRegistry, RegistryBuilder, TxMessage};
pub use staking::{
    CommissionRates, Description, MsgBeginRedelegate, MsgCreateValidator, MsgDelegate,
    MsgEditValidator, MsgUndelegate,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::error::Result;
use crate::chain::proto::{self, Any};

/// Coin defines a token with a denomination and a string-encoded integer amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

impl Coin {
    pub fn new(amount: impl ToString, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.to_string(),
        }
    }
}

impl From<&Coin> for proto::Coin {
    fn from(coin: &Coin) -> Self {
        proto::Coin {
            denom: coin.denom.clone(),
            amount: coin.amount.clone(),
        }
    }
}

impl From<proto::Coin> for Coin {
    fn from(coin: proto::Coin) -> Self {
        Coin {
            denom: coin.denom,
            amount: coin.amount,
        }
    }
}

pub(crate) fn proto_coins(coins: &[Coin]) -> Vec<proto::Coin> {
    coins.iter().map(proto::Coin::from).collect()
}

/// Legacy amino JSON form of a message: `{"type": ..., "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AminoMsg {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub value: Value,
}

/// A transaction message that can render itself for both signing modes.
pub trait Msg: Send + Sync {
    /// Binary envelope used in `TxBody.messages`.
    fn to_any(&self) -> Result<Any>;

    /// Legacy JSON form used in amino sign documents.
    fn to_amino(&self) -> Result<AminoMsg>;
}

impl<M: Msg + ?Sized> Msg for Box<M> {
    fn to_any(&self) -> Result<Any> {
        (**self).to_any()
    }

    fn to_amino(&self) -> Result<AminoMsg> {
        (**self).to_amino()
    }
}
