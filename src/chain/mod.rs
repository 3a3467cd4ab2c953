pub mod account_types;
pub mod broadcast;
pub mod client;
pub mod error;
pub mod messages;
pub mod proto;
pub mod pub_key;
pub mod queries;
pub mod rpc;
pub mod signer;
pub mod tx_builder;
pub mod tx_result;
pub mod wallet;

pub use account_types::{Account, AccountInfo};
pub use broadcast::{BroadcastMode, BroadcastResult};
pub use client::{BankTx, MerlionClient, SingleMsgTx, StakingTx};
pub use error::{Error, ErrorKind, Result};
pub use messages::{Coin, Msg, MsgDecoderRegistry, TxMessage};
pub use pub_key::{decode_pubkey, encode_pubkey, PubKey, SinglePubKey};
pub use queries::Querier;
pub use rpc::{ChainRpc, ClientConfig, GrpcRpc};
pub use signer::{AminoSigner, DirectSigner, OfflineSigner};
pub use tx_builder::{gas_to_fee, SignerData, TxBuilder, TxOptions};
pub use tx_result::{ArrayLogEntry, Tx, TxResultCode};
pub use wallet::{LocalWallet, WalletFlavor};
