use bech32::{self, Hrp};
use bip32::{DerivationPath, XPrv};
use bip39::Mnemonic;
use ripemd::Ripemd160;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use tiny_keccak::{Hasher, Keccak};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::chain::error::{Error, Result};
use crate::chain::signer::{AccountData, Algo};

const COSMOS_HD_PATH: &str = "m/44'/118'/0'/0/0";
const ETHERMINT_HD_PATH: &str = "m/44'/60'/0'/0/0";

/// Key derivation and signing scheme of a local wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletFlavor {
    /// Cosmos secp256k1: coin type 118, sha256 digests, ripemd160 addresses.
    Cosmos,
    /// Ethermint eth_secp256k1: coin type 60, keccak256 digests and addresses.
    Ethermint,
}

impl WalletFlavor {
    pub fn hd_path(&self) -> &'static str {
        match self {
            WalletFlavor::Cosmos => COSMOS_HD_PATH,
            WalletFlavor::Ethermint => ETHERMINT_HD_PATH,
        }
    }

    pub fn algo(&self) -> Algo {
        match self {
            WalletFlavor::Cosmos => Algo::Secp256k1,
            WalletFlavor::Ethermint => Algo::EthSecp256k1,
        }
    }
}

/// Local mnemonic wallet holding a single secp256k1 key.
/// Key material is zeroized when the wallet is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct LocalWallet {
    #[zeroize(skip)]
    pub address: String,
    #[zeroize(skip)]
    flavor: WalletFlavor,

    private_key_bytes: [u8; 32],
    public_key_compressed: [u8; 33],
}

fn key_error(e: impl std::fmt::Display) -> Error {
    Error::Signing(format!("key derivation failed: {}", e))
}

impl LocalWallet {
    /// Create a wallet from a BIP39 mnemonic phrase with optional passphrase
    pub fn from_mnemonic(
        mnemonic_str: &str,
        passphrase: &str,
        prefix: &str,
        flavor: WalletFlavor,
    ) -> Result<Self> {
        let mnemonic = Mnemonic::parse(mnemonic_str).map_err(key_error)?;
        let mut seed = mnemonic.to_seed(passphrase);

        let path: DerivationPath = flavor.hd_path().parse().map_err(key_error)?;
        let derived = XPrv::derive_from_path(seed, &path).map_err(key_error);
        seed.zeroize();

        let mut private_key = derived?.to_bytes();
        let wallet = Self::from_private_key(&private_key, prefix, flavor);
        private_key.zeroize();
        wallet
    }

    pub fn from_private_key(private_key: &[u8; 32], prefix: &str, flavor: WalletFlavor) -> Result<Self> {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(private_key).map_err(key_error)?;
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);

        let address = derive_address(&public_key, prefix, flavor)?;

        Ok(Self {
            address,
            flavor,
            private_key_bytes: *private_key,
            public_key_compressed: public_key.serialize(),
        })
    }

    pub fn flavor(&self) -> WalletFlavor {
        self.flavor
    }

    /// Get the private key as a SecretKey (for signing)
    pub(crate) fn private_key(&self) -> Result<SecretKey> {
        SecretKey::from_slice(&self.private_key_bytes).map_err(key_error)
    }

    /// Get the public key as compressed bytes (33 bytes)
    pub fn public_key_compressed(&self) -> [u8; 33] {
        self.public_key_compressed
    }

    pub fn account_data(&self) -> AccountData {
        AccountData {
            address: self.address.clone(),
            algo: self.flavor.algo(),
            pubkey: self.public_key_compressed.to_vec(),
        }
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.address)
            .field("flavor", &self.flavor)
            .finish_non_exhaustive()
    }
}

pub(crate) fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut hash = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut hash);
    hash
}

/// Bech32 account address for a public key.
fn derive_address(public_key: &PublicKey, prefix: &str, flavor: WalletFlavor) -> Result<String> {
    let addr_bytes: Vec<u8> = match flavor {
        WalletFlavor::Cosmos => {
            let sha = Sha256::digest(public_key.serialize());
            Ripemd160::digest(sha).to_vec()
        }
        WalletFlavor::Ethermint => {
            // keccak256 over X||Y, last 20 bytes
            let uncompressed = public_key.serialize_uncompressed();
            keccak256(&uncompressed[1..])[12..].to_vec()
        }
    };

    let hrp = Hrp::parse(prefix).map_err(key_error)?;
    bech32::encode::<bech32::Bech32>(hrp, &addr_bytes).map_err(key_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_cosmos_known_address() {
        let wallet = LocalWallet::from_mnemonic(MNEMONIC, "", "cosmos", WalletFlavor::Cosmos).unwrap();
        assert_eq!(wallet.address, "cosmos19rl4cm2hmr8afy4kldpxz3fka4jguq0auqdal4");
    }

    #[test]
    fn test_ethermint_address_matches_eth_account() {
        let wallet = LocalWallet::from_mnemonic(MNEMONIC, "", "mer", WalletFlavor::Ethermint).unwrap();
        assert!(wallet.address.starts_with("mer1"));
        let (_, data) = bech32::decode(&wallet.address).unwrap();
        assert_eq!(hex::encode(data), "9858effd232b4033e47d90003d41ec34ecaeda94");
    }

    #[test]
    fn test_wallet_with_passphrase() {
        let wallet1 = LocalWallet::from_mnemonic(MNEMONIC, "", "mer", WalletFlavor::Ethermint).unwrap();
        let wallet2 = LocalWallet::from_mnemonic(MNEMONIC, "test123", "mer", WalletFlavor::Ethermint).unwrap();
        assert_ne!(wallet1.address, wallet2.address);

        let wallet3 = LocalWallet::from_mnemonic(MNEMONIC, "test123", "mer", WalletFlavor::Ethermint).unwrap();
        assert_eq!(wallet2.address, wallet3.address);
    }

    #[test]
    fn test_account_data_shape() {
        let wallet = LocalWallet::from_mnemonic(MNEMONIC, "", "mer", WalletFlavor::Ethermint).unwrap();
        let account = wallet.account_data();
        assert_eq!(account.algo, Algo::EthSecp256k1);
        assert_eq!(account.pubkey.len(), 33);
        assert!(account.pubkey[0] == 0x02 || account.pubkey[0] == 0x03);
        assert!(account.pub_key().is_ok());
    }

    #[test]
    fn test_invalid_mnemonic() {
        let result = LocalWallet::from_mnemonic("not a mnemonic", "", "mer", WalletFlavor::Cosmos);
        assert!(matches!(result, Err(Error::Signing(_))));
    }

    #[test]
    fn test_debug_hides_key_material() {
        let wallet = LocalWallet::from_private_key(&[7u8; 32], "mer", WalletFlavor::Cosmos).unwrap();
        let debug = format!("{:?}", wallet);
        assert!(debug.contains(&wallet.address));
        assert!(!debug.contains("private_key"));
    }
}
