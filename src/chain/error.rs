/// Error type shared by every chain-facing component of the SDK.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], used by callers that only want to
/// know whether an operation can be retried as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-fixable before retry (bad options, wrong signer for the path).
    Configuration,
    /// RPC or transport failure, surfaced verbatim.
    Network,
    /// The node refused the transaction at submission time.
    ChainRejection,
    /// The transaction was submitted but not seen on chain before the deadline.
    ConfirmationTimeout,
    /// A binary or JSON payload could not be turned into a typed value.
    Decode,
    /// The signer backend or local key material failed.
    Signing,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid public key: {0}")]
    InvalidKeyFormat(String),

    #[error("public key type {0} not recognized")]
    UnsupportedKeyType(String),

    #[error("unsupported account type: {0}")]
    UnsupportedAccountType(String),

    #[error("cannot sign with account of type \"{0}\", can only sign with \"EthAccount\" and \"BaseAccount\"")]
    UnsignableAccount(String),

    #[error("cannot find account \"{0}\", make sure it has a balance")]
    AccountNotFound(String),

    #[error("failed to retrieve account {0} from signer")]
    SignerAccountNotFound(String),

    #[error("{0}() is not supported in readonly mode")]
    ReadonlyModeUnsupported(&'static str),

    #[error("wrong signer type, expected {0}")]
    WrongSignerType(&'static str),

    #[error("unknown broadcast mode \"{0}\", must be either \"sync\" or \"async\"")]
    UnknownBroadcastMode(String),

    #[error("invalid transaction options: {0}")]
    InvalidOptions(String),

    #[error("broadcasting transaction failed with code {code} (codespace: {codespace}). Log: {raw_log}")]
    BroadcastRejected {
        code: u32,
        codespace: String,
        raw_log: String,
    },

    #[error("transaction {tx_hash} was submitted but was not yet found on the chain, you might want to check later")]
    ConfirmationTimeout { tx_hash: String },

    #[error("node returned no tx_response for broadcast")]
    MissingTxResponse,

    #[error("tx response {0} carries no embedded transaction")]
    MissingTx(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("rpc call failed: {0}")]
    Rpc(#[from] tonic::Status),

    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("protobuf decode error: {0}")]
    ProtoDecode(#[from] prost::DecodeError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownBroadcastMode(_)
            | Error::WrongSignerType(_)
            | Error::InvalidOptions(_)
            | Error::ReadonlyModeUnsupported(_)
            | Error::SignerAccountNotFound(_)
            | Error::UnsignableAccount(_)
            | Error::AccountNotFound(_) => ErrorKind::Configuration,
            Error::Rpc(_) | Error::Transport(_) | Error::MissingTxResponse => ErrorKind::Network,
            Error::BroadcastRejected { .. } => ErrorKind::ChainRejection,
            Error::ConfirmationTimeout { .. } => ErrorKind::ConfirmationTimeout,
            Error::InvalidKeyFormat(_)
            | Error::UnsupportedKeyType(_)
            | Error::UnsupportedAccountType(_)
            | Error::MissingTx(_)
            | Error::ProtoDecode(_)
            | Error::Json(_)
            | Error::Hex(_) => ErrorKind::Decode,
            Error::Signing(_) => ErrorKind::Signing,
        }
    }

    /// True for errors that say nothing about whether the transaction landed.
    pub fn is_unknown_outcome(&self) -> bool {
        matches!(self, Error::ConfirmationTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert_eq!(
            Error::UnknownBroadcastMode("block".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            Error::BroadcastRejected {
                code: 32,
                codespace: "sdk".into(),
                raw_log: "account sequence mismatch".into(),
            }
            .kind(),
            ErrorKind::ChainRejection
        );
        let timeout = Error::ConfirmationTimeout { tx_hash: "AB".into() };
        assert_eq!(timeout.kind(), ErrorKind::ConfirmationTimeout);
        assert!(timeout.is_unknown_outcome());
        assert_eq!(
            Error::UnsupportedAccountType("/x.Y".into()).kind(),
            ErrorKind::Decode
        );
    }

    #[test]
    fn test_rejection_message_carries_details() {
        let err = Error::BroadcastRejected {
            code: 5,
            codespace: "sdk".into(),
            raw_log: "insufficient funds".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("code 5"));
        assert!(msg.contains("codespace: sdk"));
        assert!(msg.contains("insufficient funds"));
    }
}
