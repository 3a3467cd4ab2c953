mod keys;
mod signer;

pub use keys::{LocalWallet, WalletFlavor};
pub use signer::TransactionSigner;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use prost::Message;

use crate::chain::error::{Error, Result};
use crate::chain::proto::SignDoc;
use crate::chain::signer::{
    AccountData, AminoSignResponse, AminoSigner, DirectSignResponse, DirectSigner, StdSignDoc,
    StdSignature,
};

impl LocalWallet {
    fn check_signer(&self, signer_address: &str) -> Result<()> {
        if signer_address != self.address {
            return Err(Error::SignerAccountNotFound(signer_address.to_string()));
        }
        Ok(())
    }

    fn std_signature(&self, sign_bytes: &[u8]) -> Result<StdSignature> {
        let private_key = self.private_key()?;
        let signature = TransactionSigner::new().sign(self.flavor(), sign_bytes, &private_key);
        Ok(StdSignature {
            pub_key: self.account_data().pub_key()?,
            signature: BASE64.encode(signature),
        })
    }
}

#[async_trait]
impl AminoSigner for LocalWallet {
    async fn get_accounts(&self) -> Result<Vec<AccountData>> {
        Ok(vec![self.account_data()])
    }

    async fn sign_amino(&self, signer_address: &str, sign_doc: StdSignDoc) -> Result<AminoSignResponse> {
        self.check_signer(signer_address)?;
        let signature = self.std_signature(&sign_doc.sign_bytes()?)?;
        Ok(AminoSignResponse {
            signed: sign_doc,
            signature,
        })
    }
}

#[async_trait]
impl DirectSigner for LocalWallet {
    async fn get_accounts(&self) -> Result<Vec<AccountData>> {
        Ok(vec![self.account_data()])
    }

    async fn sign_direct(&self, signer_address: &str, sign_doc: SignDoc) -> Result<DirectSignResponse> {
        self.check_signer(signer_address)?;
        let signature = self.std_signature(&sign_doc.encode_to_vec())?;
        Ok(DirectSignResponse {
            signed: sign_doc,
            signature,
        })
    }
}
