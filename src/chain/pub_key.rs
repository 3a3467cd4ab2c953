/// Public key codec
///
/// Converts between the amino-style tagged public keys used by signers and
/// wallets (`{"type": ..., "value": base64}`) and the `Any` envelopes that are
/// placed into `SignerInfo` and account records on chain.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use prost::Message;
use serde::{Deserialize, Serialize};

use crate::chain::error::{Error, Result};
use crate::chain::proto::{
    to_any, type_url, Any, Ed25519PubKey, EthSecp256k1PubKey, LegacyAminoPubKey, Secp256k1PubKey,
};

const SECP256K1_COMPRESSED_LEN: usize = 33;
const ED25519_LEN: usize = 32;

/// A single (non-composite) public key, value is the base64 of the raw key bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum SinglePubKey {
    #[serde(rename = "ethermint/PubKeyEthSecp256k1")]
    EthSecp256k1(String),
    #[serde(rename = "tendermint/PubKeySecp256k1")]
    Secp256k1(String),
    #[serde(rename = "tendermint/PubKeyEd25519")]
    Ed25519(String),
}

/// Threshold multisig key: `threshold` is a string-encoded integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigThresholdPubKey {
    pub threshold: String,
    pub pubkeys: Vec<SinglePubKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PubKey {
    Single(SinglePubKey),
    MultisigThreshold(MultisigThresholdKey),
}

/// Amino JSON wrapper giving the multisig key its `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum MultisigThresholdKey {
    #[serde(rename = "tendermint/PubKeyMultisigThreshold")]
    Threshold(MultisigThresholdPubKey),
}

fn check_secp256k1(key: &[u8]) -> Result<()> {
    if key.len() != SECP256K1_COMPRESSED_LEN || (key[0] != 0x02 && key[0] != 0x03) {
        return Err(Error::InvalidKeyFormat(
            "public key must be compressed secp256k1, i.e. 33 bytes starting with 0x02 or 0x03"
                .to_string(),
        ));
    }
    Ok(())
}

fn check_ed25519(key: &[u8]) -> Result<()> {
    if key.len() != ED25519_LEN {
        return Err(Error::InvalidKeyFormat(
            "public key must be Ed25519, i.e. 32 bytes".to_string(),
        ));
    }
    Ok(())
}

impl SinglePubKey {
    pub fn secp256k1(key: &[u8]) -> Result<Self> {
        check_secp256k1(key)?;
        Ok(SinglePubKey::Secp256k1(BASE64.encode(key)))
    }

    pub fn eth_secp256k1(key: &[u8]) -> Result<Self> {
        check_secp256k1(key)?;
        Ok(SinglePubKey::EthSecp256k1(BASE64.encode(key)))
    }

    pub fn ed25519(key: &[u8]) -> Result<Self> {
        check_ed25519(key)?;
        Ok(SinglePubKey::Ed25519(BASE64.encode(key)))
    }

    /// Amino type tag, e.g. `tendermint/PubKeySecp256k1`.
    pub fn type_tag(&self) -> &'static str {
        match self {
            SinglePubKey::EthSecp256k1(_) => "ethermint/PubKeyEthSecp256k1",
            SinglePubKey::Secp256k1(_) => "tendermint/PubKeySecp256k1",
            SinglePubKey::Ed25519(_) => "tendermint/PubKeyEd25519",
        }
    }

    /// Raw key bytes, validated against the shape of the variant.
    pub fn key_bytes(&self) -> Result<Vec<u8>> {
        let encoded = match self {
            SinglePubKey::EthSecp256k1(v) | SinglePubKey::Secp256k1(v) | SinglePubKey::Ed25519(v) => v,
        };
        let key = BASE64
            .decode(encoded)
            .map_err(|e| Error::InvalidKeyFormat(format!("key is not valid base64: {}", e)))?;
        match self {
            SinglePubKey::EthSecp256k1(_) | SinglePubKey::Secp256k1(_) => check_secp256k1(&key)?,
            SinglePubKey::Ed25519(_) => check_ed25519(&key)?,
        }
        Ok(key)
    }
}

impl PubKey {
    pub fn multisig(threshold: u32, pubkeys: Vec<SinglePubKey>) -> Self {
        PubKey::MultisigThreshold(MultisigThresholdKey::Threshold(MultisigThresholdPubKey {
            threshold: threshold.to_string(),
            pubkeys,
        }))
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            PubKey::Single(single) => single.type_tag(),
            PubKey::MultisigThreshold(_) => "tendermint/PubKeyMultisigThreshold",
        }
    }
}

impl From<SinglePubKey> for PubKey {
    fn from(key: SinglePubKey) -> Self {
        PubKey::Single(key)
    }
}

fn encode_single(key: &SinglePubKey) -> Result<Any> {
    let bytes = key.key_bytes()?;
    let any = match key {
        SinglePubKey::Secp256k1(_) => to_any(type_url::SECP256K1_PUBKEY, &Secp256k1PubKey { key: bytes }),
        SinglePubKey::EthSecp256k1(_) => {
            to_any(type_url::ETH_SECP256K1_PUBKEY, &EthSecp256k1PubKey { key: bytes })
        }
        SinglePubKey::Ed25519(_) => to_any(type_url::ED25519_PUBKEY, &Ed25519PubKey { key: bytes }),
    };
    Ok(any)
}

/// Encode a tagged public key into its `Any` envelope.
pub fn encode_pubkey(pub_key: &PubKey) -> Result<Any> {
    match pub_key {
        PubKey::Single(single) => encode_single(single),
        PubKey::MultisigThreshold(MultisigThresholdKey::Threshold(multisig)) => {
            let threshold: u32 = multisig.threshold.parse().map_err(|_| {
                Error::InvalidKeyFormat(format!(
                    "multisig threshold {:?} is not an unsigned integer",
                    multisig.threshold
                ))
            })?;
            if threshold == 0 || threshold as usize > multisig.pubkeys.len() {
                return Err(Error::InvalidKeyFormat(format!(
                    "multisig threshold {} is not within 1..={}",
                    threshold,
                    multisig.pubkeys.len()
                )));
            }
            let public_keys = multisig
                .pubkeys
                .iter()
                .map(encode_single)
                .collect::<Result<Vec<_>>>()?;
            Ok(to_any(
                type_url::MULTISIG_PUBKEY,
                &LegacyAminoPubKey { threshold, public_keys },
            ))
        }
    }
}

fn decode_single(any: &Any) -> Result<SinglePubKey> {
    match any.type_url.as_str() {
        type_url::SECP256K1_PUBKEY => {
            let key = Secp256k1PubKey::decode(any.value.as_slice())?.key;
            SinglePubKey::secp256k1(&key)
        }
        type_url::ETH_SECP256K1_PUBKEY => {
            let key = EthSecp256k1PubKey::decode(any.value.as_slice())?.key;
            SinglePubKey::eth_secp256k1(&key)
        }
        type_url::ED25519_PUBKEY => {
            let key = Ed25519PubKey::decode(any.value.as_slice())?.key;
            SinglePubKey::ed25519(&key)
        }
        other => Err(Error::UnsupportedKeyType(other.to_string())),
    }
}

/// Decode an `Any` envelope back into a tagged public key.
///
/// A missing or empty envelope means "no public key on record" and yields `None`.
pub fn decode_pubkey(any: Option<&Any>) -> Result<Option<PubKey>> {
    let any = match any {
        Some(any) if !any.value.is_empty() || any.type_url == type_url::MULTISIG_PUBKEY => any,
        _ => return Ok(None),
    };

    match any.type_url.as_str() {
        type_url::MULTISIG_PUBKEY => {
            let LegacyAminoPubKey { threshold, public_keys } =
                LegacyAminoPubKey::decode(any.value.as_slice())?;
            let pubkeys = public_keys
                .iter()
                .map(decode_single)
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(PubKey::multisig(threshold, pubkeys)))
        }
        _ => decode_single(any).map(|single| Some(PubKey::Single(single))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secp_key(prefix: u8, fill: u8) -> Vec<u8> {
        let mut key = vec![fill; 33];
        key[0] = prefix;
        key
    }

    #[test]
    fn test_secp256k1_roundtrip_both_flavours() {
        for prefix in [0x02u8, 0x03] {
            let raw = secp_key(prefix, 0x5a);

            let plain: PubKey = SinglePubKey::secp256k1(&raw).unwrap().into();
            let any = encode_pubkey(&plain).unwrap();
            assert_eq!(any.type_url, type_url::SECP256K1_PUBKEY);
            assert_eq!(decode_pubkey(Some(&any)).unwrap(), Some(plain));

            let eth: PubKey = SinglePubKey::eth_secp256k1(&raw).unwrap().into();
            let any = encode_pubkey(&eth).unwrap();
            assert_eq!(any.type_url, type_url::ETH_SECP256K1_PUBKEY);
            assert_eq!(decode_pubkey(Some(&any)).unwrap(), Some(eth));
        }
    }

    #[test]
    fn test_secp256k1_shape_is_enforced() {
        assert!(matches!(
            SinglePubKey::secp256k1(&secp_key(0x04, 1)),
            Err(Error::InvalidKeyFormat(_))
        ));
        assert!(matches!(
            SinglePubKey::eth_secp256k1(&[0x02; 32]),
            Err(Error::InvalidKeyFormat(_))
        ));
        assert!(matches!(
            SinglePubKey::secp256k1(&[0x02; 65]),
            Err(Error::InvalidKeyFormat(_))
        ));

        // A hand-built value that skipped the constructor is caught on encode.
        let forged: PubKey = SinglePubKey::Secp256k1(BASE64.encode([0x02u8; 20])).into();
        assert!(matches!(encode_pubkey(&forged), Err(Error::InvalidKeyFormat(_))));
    }

    #[test]
    fn test_ed25519_roundtrip() {
        let key: PubKey = SinglePubKey::ed25519(&[9u8; 32]).unwrap().into();
        let any = encode_pubkey(&key).unwrap();
        assert_eq!(any.type_url, type_url::ED25519_PUBKEY);
        assert_eq!(decode_pubkey(Some(&any)).unwrap(), Some(key));
        assert!(SinglePubKey::ed25519(&[9u8; 33]).is_err());
    }

    #[test]
    fn test_multisig_roundtrip_keeps_order_and_threshold() {
        let members = vec![
            SinglePubKey::secp256k1(&secp_key(0x02, 1)).unwrap(),
            SinglePubKey::eth_secp256k1(&secp_key(0x03, 2)).unwrap(),
            SinglePubKey::ed25519(&[3u8; 32]).unwrap(),
        ];
        let key = PubKey::multisig(2, members.clone());
        let any = encode_pubkey(&key).unwrap();
        assert_eq!(any.type_url, type_url::MULTISIG_PUBKEY);

        let proto = LegacyAminoPubKey::decode(any.value.as_slice()).unwrap();
        assert_eq!(proto.threshold, 2);
        assert_eq!(proto.public_keys.len(), 3);

        assert_eq!(decode_pubkey(Some(&any)).unwrap(), Some(key));
    }

    #[test]
    fn test_multisig_threshold_must_fit_members() {
        let member = SinglePubKey::ed25519(&[7u8; 32]).unwrap();
        let keys = [
            PubKey::multisig(0, vec![]),
            PubKey::multisig(0, vec![member.clone()]),
            PubKey::multisig(2, vec![member]),
        ];
        for key in keys {
            assert!(matches!(encode_pubkey(&key), Err(Error::InvalidKeyFormat(_))));
        }
    }

    #[test]
    fn test_multisig_decode_is_not_treated_as_absent() {
        let empty = Any { type_url: type_url::MULTISIG_PUBKEY.to_string(), value: vec![] };
        assert_eq!(decode_pubkey(Some(&empty)).unwrap(), Some(PubKey::multisig(0, vec![])));

        let wide = to_any(
            type_url::MULTISIG_PUBKEY,
            &LegacyAminoPubKey { threshold: u32::MAX, public_keys: vec![] },
        );
        match decode_pubkey(Some(&wide)).unwrap() {
            Some(PubKey::MultisigThreshold(MultisigThresholdKey::Threshold(m))) => {
                assert_eq!(m.threshold, u32::MAX.to_string())
            }
            other => panic!("unexpected key {:?}", other),
        }
    }

    #[test]
    fn test_bad_multisig_threshold() {
        let key = PubKey::MultisigThreshold(MultisigThresholdKey::Threshold(MultisigThresholdPubKey {
            threshold: "two".to_string(),
            pubkeys: vec![],
        }));
        assert!(matches!(encode_pubkey(&key), Err(Error::InvalidKeyFormat(_))));
    }

    #[test]
    fn test_decode_absent_and_unknown() {
        assert_eq!(decode_pubkey(None).unwrap(), None);
        let empty = Any { type_url: type_url::SECP256K1_PUBKEY.to_string(), value: vec![] };
        assert_eq!(decode_pubkey(Some(&empty)).unwrap(), None);

        let unknown = Any { type_url: "/cosmos.crypto.sr25519.PubKey".to_string(), value: vec![1, 2] };
        match decode_pubkey(Some(&unknown)) {
            Err(Error::UnsupportedKeyType(url)) => assert_eq!(url, "/cosmos.crypto.sr25519.PubKey"),
            other => panic!("expected unsupported key type, got {:?}", other),
        }
    }

    #[test]
    fn test_amino_json_shape() {
        let key: PubKey = SinglePubKey::secp256k1(&secp_key(0x02, 0)).unwrap().into();
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(json["type"], "tendermint/PubKeySecp256k1");

        let multisig = PubKey::multisig(1, vec![SinglePubKey::ed25519(&[1u8; 32]).unwrap()]);
        let json = serde_json::to_value(&multisig).unwrap();
        assert_eq!(json["type"], "tendermint/PubKeyMultisigThreshold");
        assert_eq!(json["value"]["threshold"], "1");
        assert_eq!(json["value"]["pubkeys"][0]["type"], "tendermint/PubKeyEd25519");

        let back: PubKey = serde_json::from_value(json).unwrap();
        assert_eq!(back, multisig);
    }
}
