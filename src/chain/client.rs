use std::marker::PhantomData;
use std::sync::Arc;

use crate::chain::broadcast::{broadcast_signed, BroadcastResult};
use crate::chain::error::Result;
use crate::chain::messages::{
    Msg, MsgBeginRedelegate, MsgCreateValidator, MsgDecoderRegistry, MsgDelegate, MsgEditValidator,
    MsgMultiSend, MsgSend, MsgUndelegate,
};
use crate::chain::proto::SimulateResponse;
use crate::chain::queries::Querier;
use crate::chain::rpc::{ChainRpc, ClientConfig, GrpcRpc};
use crate::chain::signer::OfflineSigner;
use crate::chain::tx_builder::{TxBuilder, TxOptions};
use crate::chain::tx_result::{self, Tx};

/// Client for one chain and, optionally, one signing address.
///
/// Every call is self-contained: sequence numbers are resolved per call, so
/// callers must serialize transactions from the same account themselves.
#[derive(Clone)]
pub struct MerlionClient {
    rpc: Arc<dyn ChainRpc>,
    signer: OfflineSigner,
    chain_id: String,
    address: String,
    registry: Arc<MsgDecoderRegistry>,
    querier: Option<Querier>,
}

impl MerlionClient {
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        chain_id: impl Into<String>,
        address: impl Into<String>,
        signer: OfflineSigner,
    ) -> Self {
        Self {
            rpc,
            signer,
            chain_id: chain_id.into(),
            address: address.into(),
            registry: Arc::new(MsgDecoderRegistry::global().clone()),
            querier: None,
        }
    }

    /// Query-only client; write operations fail.
    pub fn readonly(rpc: Arc<dyn ChainRpc>, chain_id: impl Into<String>) -> Self {
        Self::new(rpc, chain_id, String::new(), OfflineSigner::Readonly)
    }

    /// Connect over gRPC.
    pub async fn connect(
        config: ClientConfig,
        chain_id: impl Into<String>,
        address: impl Into<String>,
        signer: OfflineSigner,
    ) -> Result<Self> {
        let rpc = GrpcRpc::connect(config).await?;
        let querier = rpc.querier();
        Ok(Self::new(Arc::new(rpc), chain_id, address, signer).with_querier(querier))
    }

    /// Attach module query clients, e.g. for a client built over a custom `ChainRpc`.
    pub fn with_querier(mut self, querier: Querier) -> Self {
        self.querier = Some(querier);
        self
    }

    /// Use a custom message registry when replaying committed transactions.
    pub fn with_registry(mut self, registry: MsgDecoderRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn signer(&self) -> &OfflineSigner {
        &self.signer
    }

    pub fn rpc(&self) -> &dyn ChainRpc {
        self.rpc.as_ref()
    }

    /// Module query clients. Present on clients from [`MerlionClient::connect`]
    /// or [`MerlionClient::with_querier`].
    pub fn query(&self) -> Option<&Querier> {
        self.querier.as_ref()
    }

    fn builder(&self) -> TxBuilder<'_> {
        TxBuilder::new(self.rpc.as_ref(), &self.signer, &self.address, &self.chain_id)
    }

    /// Sign `messages` and dry-run them on the node, e.g. for gas estimation.
    pub async fn simulate<M: Msg>(&self, messages: &[M], options: &TxOptions) -> Result<SimulateResponse> {
        let tx_bytes = self.builder().prepare_and_sign(messages, options).await?;
        self.rpc.simulate(tx_bytes).await
    }

    /// Sign and broadcast `messages`.
    pub async fn broadcast<M: Msg>(&self, messages: &[M], options: &TxOptions) -> Result<BroadcastResult> {
        let tx_bytes = self.builder().prepare_and_sign(messages, options).await?;
        self.broadcast_tx_bytes(tx_bytes, options).await
    }

    /// Broadcast an already signed `TxRaw`.
    pub async fn broadcast_tx_bytes(&self, tx_bytes: Vec<u8>, options: &TxOptions) -> Result<BroadcastResult> {
        broadcast_signed(self.rpc.as_ref(), &self.registry, tx_bytes, options).await
    }

    pub async fn get_tx(&self, hash: &str) -> Result<Option<Tx>> {
        tx_result::get_tx(self.rpc.as_ref(), &self.registry, hash).await
    }

    /// Transactions matching an event query such as
    /// `message.sender='mer1...' AND message.action='/cosmos.bank.v1beta1.MsgSend'`.
    pub async fn search_txs(&self, query: &str) -> Result<Vec<Tx>> {
        tx_result::search_txs(self.rpc.as_ref(), &self.registry, query).await
    }

    pub fn bank(&self) -> BankTx<'_> {
        BankTx { client: self }
    }

    pub fn staking(&self) -> StakingTx<'_> {
        StakingTx { client: self }
    }
}

impl std::fmt::Debug for MerlionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerlionClient")
            .field("chain_id", &self.chain_id)
            .field("address", &self.address)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

/// A single-message transaction: broadcast it, or simulate it first.
pub struct SingleMsgTx<'a, M> {
    client: &'a MerlionClient,
    _msg: PhantomData<fn(M)>,
}

impl<'a, M: Msg> SingleMsgTx<'a, M> {
    fn new(client: &'a MerlionClient) -> Self {
        Self {
            client,
            _msg: PhantomData,
        }
    }

    pub async fn broadcast(&self, msg: M, options: &TxOptions) -> Result<BroadcastResult> {
        self.client.broadcast(&[msg], options).await
    }

    pub async fn simulate(&self, msg: M, options: &TxOptions) -> Result<SimulateResponse> {
        self.client.simulate(&[msg], options).await
    }
}

pub struct BankTx<'a> {
    client: &'a MerlionClient,
}

impl<'a> BankTx<'a> {
    pub fn send(&self) -> SingleMsgTx<'a, MsgSend> {
        SingleMsgTx::new(self.client)
    }

    pub fn multi_send(&self) -> SingleMsgTx<'a, MsgMultiSend> {
        SingleMsgTx::new(self.client)
    }
}

pub struct StakingTx<'a> {
    client: &'a MerlionClient,
}

impl<'a> StakingTx<'a> {
    pub fn delegate(&self) -> SingleMsgTx<'a, MsgDelegate> {
        SingleMsgTx::new(self.client)
    }

    pub fn undelegate(&self) -> SingleMsgTx<'a, MsgUndelegate> {
        SingleMsgTx::new(self.client)
    }

    pub fn begin_redelegate(&self) -> SingleMsgTx<'a, MsgBeginRedelegate> {
        SingleMsgTx::new(self.client)
    }

    pub fn create_validator(&self) -> SingleMsgTx<'a, MsgCreateValidator> {
        SingleMsgTx::new(self.client)
    }

    pub fn edit_validator(&self) -> SingleMsgTx<'a, MsgEditValidator> {
        SingleMsgTx::new(self.client)
    }
}
