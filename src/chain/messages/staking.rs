use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{AminoMsg, Coin, Msg};
use crate::chain::error::{Error, Result};
use crate::chain::proto::{self, to_any, type_url, Any};
use crate::chain::pub_key::{encode_pubkey, PubKey};

/// `sdk.Dec` fixed precision.
const DEC_PRECISION: u32 = 18;

/// Parse a decimal string ("0.05") into `sdk.Dec` atomics (value * 10^18).
fn dec_atomics(value: &str) -> Result<u128> {
    let invalid = || Error::InvalidOptions(format!("{:?} is not a valid decimal", value));
    let (int, frac) = value.split_once('.').unwrap_or((value, ""));
    if (int.is_empty() && frac.is_empty())
        || frac.len() > DEC_PRECISION as usize
        || !int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }
    let int: u128 = if int.is_empty() { 0 } else { int.parse().map_err(|_| invalid())? };
    let frac_atomics: u128 = if frac.is_empty() {
        0
    } else {
        let scale = 10u128.pow(DEC_PRECISION - frac.len() as u32);
        frac.parse::<u128>().map_err(|_| invalid())? * scale
    };
    int.checked_mul(10u128.pow(DEC_PRECISION))
        .and_then(|v| v.checked_add(frac_atomics))
        .ok_or_else(invalid)
}

/// Protobuf form of `sdk.Dec`: the atomics as an integer string.
fn dec_to_proto(value: &str) -> Result<String> {
    Ok(dec_atomics(value)?.to_string())
}

/// Amino JSON form of `sdk.Dec`: always 18 fractional digits.
fn dec_to_amino(value: &str) -> Result<String> {
    let atomics = dec_atomics(value)?;
    let unit = 10u128.pow(DEC_PRECISION);
    Ok(format!("{}.{:018}", atomics / unit, atomics % unit))
}

/// Validator description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub moniker: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub identity: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub website: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub security_contact: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
}

impl From<&Description> for proto::Description {
    fn from(d: &Description) -> Self {
        proto::Description {
            moniker: d.moniker.clone(),
            identity: d.identity.clone(),
            website: d.website.clone(),
            security_contact: d.security_contact.clone(),
            details: d.details.clone(),
        }
    }
}

/// Commission parameters, given as decimal strings such as "0.10".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRates {
    pub rate: String,
    pub max_rate: String,
    pub max_change_rate: String,
}

/// Delegate coins from a delegator to a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgDelegate {
    pub delegator_address: String,
    pub validator_address: String,
    pub amount: Coin,
}

impl Msg for MsgDelegate {
    fn to_any(&self) -> Result<Any> {
        let msg = proto::MsgDelegate {
            delegator_address: self.delegator_address.clone(),
            validator_address: self.validator_address.clone(),
            amount: Some((&self.amount).into()),
        };
        Ok(to_any(type_url::MSG_DELEGATE, &msg))
    }

    fn to_amino(&self) -> Result<AminoMsg> {
        Ok(AminoMsg {
            msg_type: "cosmos-sdk/MsgDelegate".to_string(),
            value: serde_json::to_value(self)?,
        })
    }
}

/// Undelegate coins from a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUndelegate {
    pub delegator_address: String,
    pub validator_address: String,
    pub amount: Coin,
}

impl Msg for MsgUndelegate {
    fn to_any(&self) -> Result<Any> {
        let msg = proto::MsgUndelegate {
            delegator_address: self.delegator_address.clone(),
            validator_address: self.validator_address.clone(),
            amount: Some((&self.amount).into()),
        };
        Ok(to_any(type_url::MSG_UNDELEGATE, &msg))
    }

    fn to_amino(&self) -> Result<AminoMsg> {
        Ok(AminoMsg {
            msg_type: "cosmos-sdk/MsgUndelegate".to_string(),
            value: serde_json::to_value(self)?,
        })
    }
}

/// Move a delegation from a source validator to a destination validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgBeginRedelegate {
    pub delegator_address: String,
    pub validator_src_address: String,
    pub validator_dst_address: String,
    pub amount: Coin,
}

impl Msg for MsgBeginRedelegate {
    fn to_any(&self) -> Result<Any> {
        let msg = proto::MsgBeginRedelegate {
            delegator_address: self.delegator_address.clone(),
            validator_src_address: self.validator_src_address.clone(),
            validator_dst_address: self.validator_dst_address.clone(),
            amount: Some((&self.amount).into()),
        };
        Ok(to_any(type_url::MSG_BEGIN_REDELEGATE, &msg))
    }

    fn to_amino(&self) -> Result<AminoMsg> {
        Ok(AminoMsg {
            msg_type: "cosmos-sdk/MsgBeginRedelegate".to_string(),
            value: serde_json::to_value(self)?,
        })
    }
}

/// Create a new validator; `pubkey` is the validator's consensus key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgCreateValidator {
    pub description: Description,
    pub commission: CommissionRates,
    pub min_self_delegation: String,
    pub delegator_address: String,
    pub validator_address: String,
    pub pubkey: PubKey,
    pub value: Coin,
}

impl Msg for MsgCreateValidator {
    fn to_any(&self) -> Result<Any> {
        let msg = proto::MsgCreateValidator {
            description: Some((&self.description).into()),
            commission: Some(proto::CommissionRates {
                rate: dec_to_proto(&self.commission.rate)?,
                max_rate: dec_to_proto(&self.commission.max_rate)?,
                max_change_rate: dec_to_proto(&self.commission.max_change_rate)?,
            }),
            min_self_delegation: self.min_self_delegation.clone(),
            delegator_address: self.delegator_address.clone(),
            validator_address: self.validator_address.clone(),
            pubkey: Some(encode_pubkey(&self.pubkey)?),
            value: Some((&self.value).into()),
        };
        Ok(to_any(type_url::MSG_CREATE_VALIDATOR, &msg))
    }

    fn to_amino(&self) -> Result<AminoMsg> {
        Ok(AminoMsg {
            msg_type: "cosmos-sdk/MsgCreateValidator".to_string(),
            value: json!({
                "description": self.description,
                "commission": {
                    "rate": dec_to_amino(&self.commission.rate)?,
                    "max_rate": dec_to_amino(&self.commission.max_rate)?,
                    "max_change_rate": dec_to_amino(&self.commission.max_change_rate)?,
                },
                "min_self_delegation": self.min_self_delegation,
                "delegator_address": self.delegator_address,
                "validator_address": self.validator_address,
                "pubkey": self.pubkey,
                "value": self.value,
            }),
        })
    }
}

/// Edit an existing validator. Unset optional fields are left unchanged on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgEditValidator {
    pub description: Description,
    pub validator_address: String,
    pub commission_rate: Option<String>,
    pub min_self_delegation: Option<String>,
}

impl Msg for MsgEditValidator {
    fn to_any(&self) -> Result<Any> {
        let msg = proto::MsgEditValidator {
            description: Some((&self.description).into()),
            validator_address: self.validator_address.clone(),
            commission_rate: self
                .commission_rate
                .as_deref()
                .map(dec_to_proto)
                .transpose()?
                .unwrap_or_default(),
            min_self_delegation: self.min_self_delegation.clone().unwrap_or_default(),
        };
        Ok(to_any(type_url::MSG_EDIT_VALIDATOR, &msg))
    }

    fn to_amino(&self) -> Result<AminoMsg> {
        let mut value = json!({
            "description": self.description,
            "validator_address": self.validator_address,
        });
        if let Some(rate) = &self.commission_rate {
            value["commission_rate"] = json!(dec_to_amino(rate)?);
        }
        if let Some(min) = &self.min_self_delegation {
            value["min_self_delegation"] = json!(min);
        }
        Ok(AminoMsg {
            msg_type: "cosmos-sdk/MsgEditValidator".to_string(),
            value,
        })
    }
}
