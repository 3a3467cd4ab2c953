/// Transaction builder
///
/// Resolves the signer account and chain state, then produces a signed
/// `TxRaw` through whichever signing capability the client holds. Body and
/// auth-info bytes always come from what the signer reports as signed.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use prost::Message;
use serde::{Deserialize, Serialize};

use crate::chain::account_types::Account;
use crate::chain::broadcast::BroadcastMode;
use crate::chain::error::{Error, Result};
use crate::chain::messages::{proto_coins, Coin, Msg};
use crate::chain::proto::{
    mode_info, Any, AuthInfo, Fee, ModeInfo, SignDoc, SignMode, SignerInfo, TxBody, TxRaw,
};
use crate::chain::pub_key::encode_pubkey;
use crate::chain::rpc::ChainRpc;
use crate::chain::signer::{AccountData, OfflineSigner, StdFee, StdSignDoc, StdSignature};

pub const DEFAULT_GAS_LIMIT: u64 = 500_000;
pub const DEFAULT_GAS_PRICE: f64 = 0.25;
pub const DEFAULT_FEE_DENOM: &str = "alion";

/// Replay-protection state of the signing account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerData {
    pub account_number: u64,
    pub sequence: u64,
    pub chain_id: String,
}

/// Per-transaction options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxOptions {
    pub gas_limit: u64,
    /// Fee is `ceil(gas_limit * gas_price_in_fee_denom)` of `fee_denom`.
    pub gas_price_in_fee_denom: f64,
    pub fee_denom: String,
    pub memo: String,
    /// If false, broadcasting returns as soon as the node accepted the bytes.
    pub wait_for_commit: bool,
    pub broadcast_timeout_ms: u64,
    /// Blocks take about 6 seconds; shorter intervals mostly add node load.
    pub broadcast_check_interval_ms: u64,
    pub broadcast_mode: BroadcastMode,
    /// Skip the account query and sign with these values.
    pub explicit_signer_data: Option<SignerData>,
}

impl Default for TxOptions {
    fn default() -> Self {
        Self {
            gas_limit: DEFAULT_GAS_LIMIT,
            gas_price_in_fee_denom: DEFAULT_GAS_PRICE,
            fee_denom: DEFAULT_FEE_DENOM.to_string(),
            memo: String::new(),
            wait_for_commit: true,
            broadcast_timeout_ms: 60_000,
            broadcast_check_interval_ms: 6_000,
            broadcast_mode: BroadcastMode::Sync,
            explicit_signer_data: None,
        }
    }
}

impl TxOptions {
    pub fn validate(&self) -> Result<()> {
        if self.gas_limit == 0 {
            return Err(Error::InvalidOptions("gas_limit must be positive".into()));
        }
        if !self.gas_price_in_fee_denom.is_finite() || self.gas_price_in_fee_denom < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "gas price {} is not a non-negative number",
                self.gas_price_in_fee_denom
            )));
        }
        if self.fee_denom.is_empty() {
            return Err(Error::InvalidOptions("fee_denom is empty".into()));
        }
        if self.wait_for_commit && self.broadcast_check_interval_ms == 0 {
            return Err(Error::InvalidOptions("broadcast_check_interval_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn fee(&self) -> StdFee {
        StdFee {
            amount: vec![Coin::new(
                gas_to_fee(self.gas_limit, self.gas_price_in_fee_denom),
                self.fee_denom.clone(),
            )],
            gas: self.gas_limit.to_string(),
            payer: None,
            granter: None,
        }
    }
}

/// `ceil(gas_limit * gas_price)`, computed on the decimal rendering of the
/// price so that `200000 * 0.1` is exactly `20000`.
pub fn gas_to_fee(gas_limit: u64, gas_price: f64) -> u128 {
    if !gas_price.is_finite() || gas_price <= 0.0 {
        return 0;
    }

    let rendered = gas_price.to_string();
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let scale = frac_part.len() as u32;

    let exact = format!("{}{}", int_part, frac_part)
        .parse::<u128>()
        .ok()
        .zip(10u128.checked_pow(scale))
        .and_then(|(atomics, denom)| {
            let product = atomics.checked_mul(gas_limit as u128)?;
            Some(product / denom + u128::from(product % denom != 0))
        });

    exact.unwrap_or_else(|| (gas_limit as f64 * gas_price).ceil() as u128)
}

fn parse_u64(field: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| Error::Signing(format!("signer returned invalid {}: {:?}", field, value)))
}

fn decode_signature(signature: &StdSignature) -> Result<Vec<u8>> {
    BASE64
        .decode(&signature.signature)
        .map_err(|e| Error::Signing(format!("signature is not base64: {}", e)))
}

fn encode_body<M: Msg>(messages: &[M], memo: &str) -> Result<Vec<u8>> {
    let messages = messages.iter().map(Msg::to_any).collect::<Result<Vec<Any>>>()?;
    let body = TxBody {
        messages,
        memo: memo.to_string(),
        ..Default::default()
    };
    Ok(body.encode_to_vec())
}

fn encode_auth_info(public_key: Any, sequence: u64, fee: &StdFee, gas_limit: u64, mode: SignMode) -> Vec<u8> {
    let signer_info = SignerInfo {
        public_key: Some(public_key),
        mode_info: Some(ModeInfo {
            sum: Some(mode_info::Sum::Single(mode_info::Single { mode: mode as i32 })),
        }),
        sequence,
    };
    let auth_info = AuthInfo {
        signer_infos: vec![signer_info],
        fee: Some(Fee {
            amount: proto_coins(&fee.amount),
            gas_limit,
            payer: fee.payer.clone().unwrap_or_default(),
            granter: fee.granter.clone().unwrap_or_default(),
        }),
        ..Default::default()
    };
    auth_info.encode_to_vec()
}

/// Builds and signs transactions for one signer address.
pub struct TxBuilder<'a> {
    rpc: &'a dyn ChainRpc,
    signer: &'a OfflineSigner,
    address: &'a str,
    chain_id: &'a str,
}

impl<'a> TxBuilder<'a> {
    pub fn new(rpc: &'a dyn ChainRpc, signer: &'a OfflineSigner, address: &'a str, chain_id: &'a str) -> Self {
        Self {
            rpc,
            signer,
            address,
            chain_id,
        }
    }

    /// The signer's account for the configured address.
    pub async fn signer_account(&self) -> Result<AccountData> {
        self.signer
            .get_accounts()
            .await?
            .into_iter()
            .find(|account| account.address == self.address)
            .ok_or_else(|| Error::SignerAccountNotFound(self.address.to_string()))
    }

    /// Explicit signer data verbatim, otherwise the on-chain account state.
    pub async fn signer_data(&self, explicit: Option<&SignerData>) -> Result<SignerData> {
        if let Some(data) = explicit {
            return Ok(data.clone());
        }

        let any = self
            .rpc
            .account(self.address)
            .await?
            .ok_or_else(|| Error::AccountNotFound(self.address.to_string()))?;
        let account = Account::decode_any(&any)?;
        log::debug!("Resolved {} account for {}", account.account_type(), self.address);

        let info = account.signer_info()?;
        Ok(SignerData {
            account_number: info.account_number,
            sequence: info.sequence,
            chain_id: self.chain_id.to_string(),
        })
    }

    /// Sign `messages` through the held capability.
    pub async fn sign<M: Msg>(
        &self,
        messages: &[M],
        fee: &StdFee,
        memo: &str,
        explicit_signer_data: Option<&SignerData>,
    ) -> Result<TxRaw> {
        let account = self.signer_account().await?;
        let signer_data = self.signer_data(explicit_signer_data).await?;

        match self.signer {
            OfflineSigner::Direct(_) => self.sign_direct(&account, messages, fee, memo, &signer_data).await,
            OfflineSigner::Amino(_) | OfflineSigner::Readonly => {
                self.sign_amino(&account, messages, fee, memo, &signer_data).await
            }
        }
    }

    pub async fn sign_direct<M: Msg>(
        &self,
        account: &AccountData,
        messages: &[M],
        fee: &StdFee,
        memo: &str,
        signer_data: &SignerData,
    ) -> Result<TxRaw> {
        if !self.signer.is_direct() {
            return Err(Error::WrongSignerType("DirectSigner"));
        }

        let body_bytes = encode_body(messages, memo)?;
        let public_key = encode_pubkey(&account.pub_key()?)?;
        let gas_limit = parse_u64("gas", &fee.gas)?;
        let auth_info_bytes = encode_auth_info(public_key, signer_data.sequence, fee, gas_limit, SignMode::Direct);

        let sign_doc = SignDoc {
            body_bytes,
            auth_info_bytes,
            chain_id: signer_data.chain_id.clone(),
            account_number: signer_data.account_number,
        };
        let response = self.signer.sign_direct(&account.address, sign_doc).await?;

        Ok(TxRaw {
            body_bytes: response.signed.body_bytes,
            auth_info_bytes: response.signed.auth_info_bytes,
            signatures: vec![decode_signature(&response.signature)?],
        })
    }

    pub async fn sign_amino<M: Msg>(
        &self,
        account: &AccountData,
        messages: &[M],
        fee: &StdFee,
        memo: &str,
        signer_data: &SignerData,
    ) -> Result<TxRaw> {
        if self.signer.is_direct() {
            return Err(Error::WrongSignerType("AminoSigner"));
        }

        let msgs = messages.iter().map(Msg::to_amino).collect::<Result<Vec<_>>>()?;
        let sign_doc = StdSignDoc {
            chain_id: signer_data.chain_id.clone(),
            account_number: signer_data.account_number.to_string(),
            sequence: signer_data.sequence.to_string(),
            fee: fee.clone(),
            msgs,
            memo: memo.to_string(),
        };
        let response = self.signer.sign_amino(&account.address, sign_doc).await?;
        let signed = response.signed;

        let body_bytes = encode_body(messages, &signed.memo)?;
        let public_key = encode_pubkey(&account.pub_key()?)?;
        let signed_gas_limit = parse_u64("gas", &signed.fee.gas)?;
        let signed_sequence = parse_u64("sequence", &signed.sequence)?;
        let auth_info_bytes = encode_auth_info(
            public_key,
            signed_sequence,
            &signed.fee,
            signed_gas_limit,
            SignMode::LegacyAminoJson,
        );

        Ok(TxRaw {
            body_bytes,
            auth_info_bytes,
            signatures: vec![decode_signature(&response.signature)?],
        })
    }

    /// Validate options, compute the fee, sign and encode.
    pub async fn prepare_and_sign<M: Msg>(&self, messages: &[M], options: &TxOptions) -> Result<Vec<u8>> {
        options.validate()?;
        let fee = options.fee();
        let tx_raw = self
            .sign(messages, &fee, &options.memo, options.explicit_signer_data.as_ref())
            .await?;
        Ok(tx_raw.encode_to_vec())
    }
}
