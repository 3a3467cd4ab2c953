use secp256k1::{Message, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

use super::keys::{keccak256, WalletFlavor};

/// Produces raw secp256k1 signatures over sign bytes.
///
/// Cosmos keys sign the sha256 digest and return the 64-byte compact `r||s`.
/// Ethermint keys sign the keccak256 digest and append the recovery id
/// (0 or 1) for a 65-byte `r||s||v`.
pub struct TransactionSigner {
    secp: Secp256k1<secp256k1::All>,
}

impl TransactionSigner {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    pub fn digest(flavor: WalletFlavor, sign_bytes: &[u8]) -> [u8; 32] {
        match flavor {
            WalletFlavor::Cosmos => {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(&Sha256::digest(sign_bytes));
                hash
            }
            WalletFlavor::Ethermint => keccak256(sign_bytes),
        }
    }

    pub fn sign(&self, flavor: WalletFlavor, sign_bytes: &[u8], private_key: &SecretKey) -> Vec<u8> {
        let message = Message::from_digest(Self::digest(flavor, sign_bytes));

        match flavor {
            WalletFlavor::Cosmos => self
                .secp
                .sign_ecdsa(&message, private_key)
                .serialize_compact()
                .to_vec(),
            WalletFlavor::Ethermint => {
                let recoverable = self.secp.sign_ecdsa_recoverable(&message, private_key);
                let (recovery_id, signature) = recoverable.serialize_compact();

                let mut sig_bytes = Vec::with_capacity(65);
                sig_bytes.extend_from_slice(&signature);
                sig_bytes.push(recovery_id.to_i32() as u8);
                sig_bytes
            }
        }
    }
}

impl Default for TransactionSigner {
    fn default() -> Self {
        Self::new()
    }
}
