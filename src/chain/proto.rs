/// Protobuf definitions for Merlion / Cosmos chain integration.
///
/// Cosmos SDK types come from `cosmos-sdk-proto`; the Ethermint account and
/// key types are not shipped there and are declared by hand below.

pub use cosmos_sdk_proto::Any;

pub use cosmos_sdk_proto::cosmos::auth::v1beta1::{
    query_client::QueryClient as AuthQueryClient, BaseAccount, ModuleAccount, QueryAccountRequest,
};
pub use cosmos_sdk_proto::cosmos::authz::v1beta1::MsgGrant;
pub use cosmos_sdk_proto::cosmos::bank::v1beta1::{Input, MsgMultiSend, MsgSend, Output};
pub use cosmos_sdk_proto::cosmos::base::abci::v1beta1::{GasInfo, TxMsgData, TxResponse};
pub use cosmos_sdk_proto::cosmos::base::v1beta1::Coin;
pub use cosmos_sdk_proto::cosmos::crypto::ed25519::PubKey as Ed25519PubKey;
pub use cosmos_sdk_proto::cosmos::crypto::multisig::LegacyAminoPubKey;
pub use cosmos_sdk_proto::cosmos::crypto::secp256k1::PubKey as Secp256k1PubKey;
pub use cosmos_sdk_proto::cosmos::staking::v1beta1::{
    CommissionRates, Description, MsgBeginRedelegate, MsgCreateValidator, MsgDelegate,
    MsgEditValidator, MsgUndelegate,
};
pub use cosmos_sdk_proto::cosmos::tx::signing::v1beta1::SignMode;
pub use cosmos_sdk_proto::cosmos::tx::v1beta1::{
    mode_info, service_client::ServiceClient, AuthInfo, BroadcastMode as ProtoBroadcastMode,
    BroadcastTxRequest, Fee, GetTxsEventRequest, ModeInfo, SignDoc, SignerInfo, SimulateRequest,
    SimulateResponse, Tx as ProtoTx, TxBody, TxRaw,
};
pub use cosmos_sdk_proto::cosmos::vesting::v1beta1::BaseVestingAccount;

pub use ethermint::crypto::v1::ethsecp256k1::PubKey as EthSecp256k1PubKey;
pub use ethermint::types::v1::EthAccount;

/// Type URLs of every envelope the SDK emits or accepts.
pub mod type_url {
    pub const BASE_ACCOUNT: &str = "/cosmos.auth.v1beta1.BaseAccount";
    pub const MODULE_ACCOUNT: &str = "/cosmos.auth.v1beta1.ModuleAccount";
    pub const BASE_VESTING_ACCOUNT: &str = "/cosmos.vesting.v1beta1.BaseVestingAccount";
    pub const ETH_ACCOUNT: &str = "/ethermint.types.v1.EthAccount";

    pub const SECP256K1_PUBKEY: &str = "/cosmos.crypto.secp256k1.PubKey";
    pub const ETH_SECP256K1_PUBKEY: &str = "/ethermint.crypto.v1.ethsecp256k1.PubKey";
    pub const ED25519_PUBKEY: &str = "/cosmos.crypto.ed25519.PubKey";
    pub const MULTISIG_PUBKEY: &str = "/cosmos.crypto.multisig.LegacyAminoPubKey";

    pub const MSG_SEND: &str = "/cosmos.bank.v1beta1.MsgSend";
    pub const MSG_MULTI_SEND: &str = "/cosmos.bank.v1beta1.MsgMultiSend";
    pub const MSG_GRANT: &str = "/cosmos.authz.v1beta1.MsgGrant";
    pub const MSG_DELEGATE: &str = "/cosmos.staking.v1beta1.MsgDelegate";
    pub const MSG_UNDELEGATE: &str = "/cosmos.staking.v1beta1.MsgUndelegate";
    pub const MSG_BEGIN_REDELEGATE: &str = "/cosmos.staking.v1beta1.MsgBeginRedelegate";
    pub const MSG_CREATE_VALIDATOR: &str = "/cosmos.staking.v1beta1.MsgCreateValidator";
    pub const MSG_EDIT_VALIDATOR: &str = "/cosmos.staking.v1beta1.MsgEditValidator";
}

pub mod ethermint {
    pub mod types {
        pub mod v1 {
            use cosmos_sdk_proto::cosmos::auth::v1beta1::BaseAccount;

            /// EthAccount implements the account interface for Ethereum-compatible
            /// accounts: a base account plus the hash of the contract code.
            #[derive(Clone, PartialEq, prost::Message)]
            pub struct EthAccount {
                #[prost(message, optional, tag = "1")]
                pub base_account: Option<BaseAccount>,

                #[prost(string, tag = "2")]
                pub code_hash: String,
            }
        }
    }

    pub mod crypto {
        pub mod v1 {
            pub mod ethsecp256k1 {
                /// Compressed secp256k1 public key of an Ethereum-style account.
                #[derive(Clone, PartialEq, prost::Message)]
                pub struct PubKey {
                    #[prost(bytes = "vec", tag = "1")]
                    pub key: Vec<u8>,
                }
            }
        }
    }
}

/// Wrap a prost message into an `Any` envelope.
pub fn to_any<M: prost::Message>(type_url: &str, msg: &M) -> Any {
    Any {
        type_url: type_url.to_string(),
        value: msg.encode_to_vec(),
    }
}
