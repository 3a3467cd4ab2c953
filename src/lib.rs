// Library exports for merlion_sdk

pub mod chain;
pub mod config;

// Re-export main types for convenience
pub use chain::{
    BroadcastMode, BroadcastResult, Error, LocalWallet, MerlionClient, OfflineSigner, Result, Tx,
    TxOptions, WalletFlavor,
};
