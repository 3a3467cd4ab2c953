/// Polymorphic account records for the Merlion chain
///
/// The auth module returns accounts wrapped in a `google.protobuf.Any`. This
/// module dispatches on the type URL to the matching record type. There is no
/// fallback: an unknown type URL is an error, since guessing the layout could
/// report a wrong sequence number and get the next transaction rejected.

use prost::Message;

use crate::chain::error::{Error, Result};
use crate::chain::proto::{
    type_url, Any, BaseAccount, BaseVestingAccount, EthAccount, ModuleAccount,
};
use crate::chain::pub_key::{decode_pubkey, PubKey};

/// Every account type the resolver understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Account {
    Eth(EthAccount),
    Base(BaseAccount),
    Module(ModuleAccount),
    BaseVesting(BaseVestingAccount),
}

/// Common account information extracted from any account type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountInfo {
    pub address: String,
    pub account_number: u64,
    pub sequence: u64,
}

impl From<&BaseAccount> for AccountInfo {
    fn from(base: &BaseAccount) -> Self {
        Self {
            address: base.address.clone(),
            account_number: base.account_number,
            sequence: base.sequence,
        }
    }
}

impl Account {
    /// Decode an `Any` account envelope into the matching variant.
    pub fn decode_any(any: &Any) -> Result<Self> {
        let value = any.value.as_slice();
        let account = match any.type_url.as_str() {
            type_url::ETH_ACCOUNT => Account::Eth(EthAccount::decode(value)?),
            type_url::BASE_ACCOUNT => Account::Base(BaseAccount::decode(value)?),
            type_url::MODULE_ACCOUNT => Account::Module(ModuleAccount::decode(value)?),
            type_url::BASE_VESTING_ACCOUNT => Account::BaseVesting(BaseVestingAccount::decode(value)?),
            unsupported => return Err(Error::UnsupportedAccountType(unsupported.to_string())),
        };

        log::debug!("Decoded account of type {}", account.account_type());
        Ok(account)
    }

    pub fn type_url(&self) -> &'static str {
        match self {
            Account::Eth(_) => type_url::ETH_ACCOUNT,
            Account::Base(_) => type_url::BASE_ACCOUNT,
            Account::Module(_) => type_url::MODULE_ACCOUNT,
            Account::BaseVesting(_) => type_url::BASE_VESTING_ACCOUNT,
        }
    }

    /// Get the account type as a string for logging and error messages
    pub fn account_type(&self) -> &'static str {
        match self {
            Account::Eth(_) => "EthAccount",
            Account::Base(_) => "BaseAccount",
            Account::Module(_) => "ModuleAccount",
            Account::BaseVesting(_) => "BaseVestingAccount",
        }
    }

    fn base_account(&self) -> Option<&BaseAccount> {
        match self {
            Account::Base(acc) => Some(acc),
            Account::Eth(acc) => acc.base_account.as_ref(),
            Account::Module(acc) => acc.base_account.as_ref(),
            Account::BaseVesting(acc) => acc.base_account.as_ref(),
        }
    }

    /// Uniform {address, account_number, sequence} view.
    ///
    /// Returns None when a wrapping record carries no base account.
    pub fn get_account_info(&self) -> Option<AccountInfo> {
        self.base_account().map(AccountInfo::from)
    }

    /// Only plain and Ethereum-style accounts may sign transactions.
    pub fn is_signable(&self) -> bool {
        matches!(self, Account::Base(_) | Account::Eth(_))
    }

    /// Replay-protection state for signing, rejecting non-signable records.
    pub fn signer_info(&self) -> Result<AccountInfo> {
        match self {
            Account::Base(acc) => Ok(AccountInfo::from(acc)),
            Account::Eth(acc) => {
                let base = acc
                    .base_account
                    .as_ref()
                    .ok_or_else(|| Error::UnsignableAccount("EthAccount without base account".to_string()))?;
                log::debug!(
                    "EthAccount {} - account_number: {}, sequence: {}",
                    base.address,
                    base.account_number,
                    base.sequence
                );
                Ok(AccountInfo::from(base))
            }
            other => Err(Error::UnsignableAccount(other.account_type().to_string())),
        }
    }

    /// Public key on record, if any.
    pub fn pub_key(&self) -> Result<Option<PubKey>> {
        match self.base_account() {
            Some(base) => decode_pubkey(base.pub_key.as_ref()),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::proto::to_any;
    use crate::chain::pub_key::{encode_pubkey, SinglePubKey};

    fn base(number: u64, sequence: u64) -> BaseAccount {
        BaseAccount {
            address: "mer1test123".to_string(),
            pub_key: None,
            account_number: number,
            sequence,
        }
    }

    #[test]
    fn test_every_supported_url_resolves_to_its_variant() {
        let cases = vec![
            to_any(type_url::BASE_ACCOUNT, &base(1, 2)),
            to_any(
                type_url::ETH_ACCOUNT,
                &EthAccount { base_account: Some(base(1, 2)), code_hash: String::new() },
            ),
            to_any(
                type_url::MODULE_ACCOUNT,
                &ModuleAccount {
                    base_account: Some(base(1, 2)),
                    name: "distribution".to_string(),
                    permissions: vec![],
                },
            ),
            to_any(
                type_url::BASE_VESTING_ACCOUNT,
                &BaseVestingAccount { base_account: Some(base(1, 2)), ..Default::default() },
            ),
        ];

        for any in cases {
            let account = Account::decode_any(&any).unwrap();
            assert_eq!(account.type_url(), any.type_url);
            let info = account.get_account_info().unwrap();
            assert_eq!(info.account_number, 1);
            assert_eq!(info.sequence, 2);
        }
    }

    #[test]
    fn test_unknown_url_is_rejected() {
        let any = Any {
            type_url: "/cosmos.vesting.v1beta1.ContinuousVestingAccount".to_string(),
            value: base(1, 1).encode_to_vec(),
        };
        match Account::decode_any(&any) {
            Err(Error::UnsupportedAccountType(url)) => {
                assert_eq!(url, "/cosmos.vesting.v1beta1.ContinuousVestingAccount")
            }
            other => panic!("expected UnsupportedAccountType, got {:?}", other),
        }
    }

    #[test]
    fn test_eth_account_uses_embedded_base_for_signing() {
        let eth = Account::Eth(EthAccount { base_account: Some(base(44, 9)), code_hash: "0x".into() });
        let info = eth.signer_info().unwrap();
        assert_eq!(info.account_number, 44);
        assert_eq!(info.sequence, 9);

        let hollow = Account::Eth(EthAccount { base_account: None, code_hash: String::new() });
        assert!(matches!(hollow.signer_info(), Err(Error::UnsignableAccount(_))));
    }

    #[test]
    fn test_module_and_vesting_accounts_cannot_sign() {
        let module = Account::Module(ModuleAccount {
            base_account: Some(base(1, 1)),
            name: "bonded_tokens_pool".to_string(),
            permissions: vec!["burner".to_string()],
        });
        assert!(!module.is_signable());
        match module.signer_info() {
            Err(Error::UnsignableAccount(kind)) => assert_eq!(kind, "ModuleAccount"),
            other => panic!("unexpected {:?}", other),
        }

        let vesting = Account::BaseVesting(BaseVestingAccount::default());
        assert!(vesting.get_account_info().is_none());
        assert!(vesting.signer_info().is_err());
    }

    #[test]
    fn test_pub_key_on_record() {
        let key: PubKey = SinglePubKey::eth_secp256k1(&[0x02; 33]).unwrap().into();
        let mut acc = base(1, 0);
        acc.pub_key = Some(encode_pubkey(&key).unwrap());
        assert_eq!(Account::Base(acc).pub_key().unwrap(), Some(key));
        assert_eq!(Account::Base(base(1, 0)).pub_key().unwrap(), None);
    }
}
