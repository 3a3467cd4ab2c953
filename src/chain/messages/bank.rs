use serde::{Deserialize, Serialize};

use super::{proto_coins, AminoMsg, Coin, Msg};
use crate::chain::error::Result;
use crate::chain::proto::{self, to_any, type_url, Any};

/// Send coins from one account to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSend {
    pub from_address: String,
    pub to_address: String,
    pub amount: Vec<Coin>,
}

impl Msg for MsgSend {
    fn to_any(&self) -> Result<Any> {
        let msg = proto::MsgSend {
            from_address: self.from_address.clone(),
            to_address: self.to_address.clone(),
            amount: proto_coins(&self.amount),
        };
        Ok(to_any(type_url::MSG_SEND, &msg))
    }

    fn to_amino(&self) -> Result<AminoMsg> {
        Ok(AminoMsg {
            msg_type: "cosmos-sdk/MsgSend".to_string(),
            value: serde_json::to_value(self)?,
        })
    }
}

/// Transaction input or output of a multi-send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub address: String,
    pub coins: Vec<Coin>,
}

/// Arbitrary multi-in, multi-out send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgMultiSend {
    pub inputs: Vec<Transfer>,
    pub outputs: Vec<Transfer>,
}

impl Msg for MsgMultiSend {
    fn to_any(&self) -> Result<Any> {
        let msg = proto::MsgMultiSend {
            inputs: self
                .inputs
                .iter()
                .map(|i| proto::Input { address: i.address.clone(), coins: proto_coins(&i.coins) })
                .collect(),
            outputs: self
                .outputs
                .iter()
                .map(|o| proto::Output { address: o.address.clone(), coins: proto_coins(&o.coins) })
                .collect(),
        };
        Ok(to_any(type_url::MSG_MULTI_SEND, &msg))
    }

    fn to_amino(&self) -> Result<AminoMsg> {
        Ok(AminoMsg {
            msg_type: "cosmos-sdk/MsgMultiSend".to_string(),
            value: serde_json::to_value(self)?,
        })
    }
}
