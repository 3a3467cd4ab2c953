use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use prost::Message;

use merlion_sdk::chain::messages::{MsgDelegate, MsgSend, TxMessage};
use merlion_sdk::chain::proto::{
    mode_info, to_any, type_url, Any, AuthInfo, BaseAccount, EthAccount, GasInfo, ProtoTx, SignMode,
    SimulateResponse, TxBody, TxRaw, TxResponse,
};
use merlion_sdk::chain::{
    BroadcastMode, BroadcastResult, ChainRpc, Coin, Error, ErrorKind, LocalWallet, MerlionClient,
    OfflineSigner, Result, TxOptions, WalletFlavor,
};

const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const TX_HASH: &str = "ABCDEF0123456789ABCDEF0123456789ABCDEF0123456789ABCDEF0123456789";

/// In-memory node: one EthAccount, admits everything with `admit_code`,
/// indexes a broadcast tx once `index_after` lookups have happened.
struct MockNode {
    address: String,
    admit_code: u32,
    index_after: u32,
    broadcasts: Mutex<Vec<(Vec<u8>, BroadcastMode)>>,
    simulations: AtomicU32,
    lookups: AtomicU32,
}

impl MockNode {
    fn new(address: &str, admit_code: u32, index_after: u32) -> Self {
        Self {
            address: address.to_string(),
            admit_code,
            index_after,
            broadcasts: Mutex::new(Vec::new()),
            simulations: AtomicU32::new(0),
            lookups: AtomicU32::new(0),
        }
    }

    fn last_tx_raw(&self) -> TxRaw {
        let broadcasts = self.broadcasts.lock().unwrap();
        TxRaw::decode(broadcasts.last().unwrap().0.as_slice()).unwrap()
    }
}

#[async_trait]
impl ChainRpc for MockNode {
    async fn account(&self, address: &str) -> Result<Option<Any>> {
        if address != self.address {
            return Ok(None);
        }
        let account = EthAccount {
            base_account: Some(BaseAccount {
                address: address.to_string(),
                pub_key: None,
                account_number: 12,
                sequence: 3,
            }),
            code_hash: "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470".to_string(),
        };
        Ok(Some(to_any(type_url::ETH_ACCOUNT, &account)))
    }

    async fn simulate(&self, _tx_bytes: Vec<u8>) -> Result<SimulateResponse> {
        self.simulations.fetch_add(1, Ordering::SeqCst);
        Ok(SimulateResponse {
            gas_info: Some(GasInfo {
                gas_wanted: 200_000,
                gas_used: 81_234,
            }),
            ..Default::default()
        })
    }

    async fn broadcast_tx(&self, tx_bytes: Vec<u8>, mode: BroadcastMode) -> Result<Option<TxResponse>> {
        self.broadcasts.lock().unwrap().push((tx_bytes, mode));
        Ok(Some(TxResponse {
            txhash: TX_HASH.to_string(),
            code: self.admit_code,
            codespace: "sdk".to_string(),
            raw_log: "account sequence mismatch".to_string(),
            ..Default::default()
        }))
    }

    async fn get_txs_event(&self, events: Vec<String>) -> Result<Vec<TxResponse>> {
        assert_eq!(events, vec![format!("tx.hash='{}'", TX_HASH)]);
        let n = self.lookups.fetch_add(1, Ordering::SeqCst) + 1;
        if n < self.index_after {
            return Ok(vec![]);
        }

        let tx_raw = self.last_tx_raw();
        let tx = ProtoTx {
            body: Some(TxBody::decode(tx_raw.body_bytes.as_slice()).unwrap()),
            auth_info: Some(AuthInfo::decode(tx_raw.auth_info_bytes.as_slice()).unwrap()),
            signatures: tx_raw.signatures,
        };
        Ok(vec![TxResponse {
            height: 1200,
            txhash: TX_HASH.to_string(),
            code: 0,
            raw_log: r#"[{"events":[{"type":"transfer","attributes":[{"key":"amount","value":"10alion"}]}]}]"#
                .to_string(),
            gas_wanted: 200_000,
            gas_used: 81_234,
            tx: Some(to_any("/cosmos.tx.v1beta1.Tx", &tx)),
            timestamp: "2024-05-01T12:00:00Z".to_string(),
            ..Default::default()
        }])
    }
}

fn wallet() -> LocalWallet {
    LocalWallet::from_mnemonic(MNEMONIC, "", "mer", WalletFlavor::Ethermint).unwrap()
}

fn client_with(node: Arc<MockNode>, signer: OfflineSigner, address: &str) -> MerlionClient {
    MerlionClient::new(node, "merlion_5000-101", address, signer)
}

fn send_to(from: &str) -> MsgSend {
    MsgSend {
        from_address: from.to_string(),
        to_address: "mer1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqnrql8a".to_string(),
        amount: vec![Coin::new(10u64, "alion")],
    }
}

fn options() -> TxOptions {
    TxOptions {
        gas_limit: 200_000,
        gas_price_in_fee_denom: 0.1,
        fee_denom: "alion".to_string(),
        ..TxOptions::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_send_end_to_end() {
    let wallet = wallet();
    let address = wallet.address.clone();
    let node = Arc::new(MockNode::new(&address, 0, 1));
    let client = client_with(node.clone(), OfflineSigner::direct(wallet), &address);

    let result = client.bank().send().broadcast(send_to(&address), &options()).await.unwrap();

    let tx = result.committed().expect("committed");
    assert_eq!(tx.code, 0);
    assert_eq!(tx.transaction_hash, TX_HASH);
    assert_eq!(node.lookups.load(Ordering::SeqCst), 1);

    let auth_info = AuthInfo::decode(node.last_tx_raw().auth_info_bytes.as_slice()).unwrap();
    let fee = auth_info.fee.unwrap();
    assert_eq!(fee.amount[0].denom, "alion");
    assert_eq!(fee.amount[0].amount, "20000");
    assert_eq!(fee.gas_limit, 200_000);
    assert_eq!(auth_info.signer_infos[0].sequence, 3);

    assert!(matches!(tx.tx.messages[0], TxMessage::Send(ref m) if m.from_address == address));
    let array_log = tx.array_log.unwrap();
    assert_eq!(array_log[0].msg, 0);
    assert_eq!(array_log[0].event_type, "transfer");
    assert_eq!(array_log[0].value, "10alion");
    assert_eq!(tx.tx.signatures[0].len(), 65);
}

#[tokio::test(start_paused = true)]
async fn test_no_wait_skips_polling() {
    let wallet = wallet();
    let address = wallet.address.clone();
    let node = Arc::new(MockNode::new(&address, 0, 1));
    let client = client_with(node.clone(), OfflineSigner::direct(wallet), &address);

    let opts = TxOptions {
        wait_for_commit: false,
        ..options()
    };
    let result = client.broadcast(&[send_to(&address)], &opts).await.unwrap();

    assert_eq!(result, BroadcastResult::Pending { tx_hash: TX_HASH.to_string() });
    assert_eq!(node.lookups.load(Ordering::SeqCst), 0);

    // caller polls on its own
    let tx = client.get_tx(TX_HASH).await.unwrap().unwrap();
    assert_eq!(tx.height, 1200);
}

#[tokio::test(start_paused = true)]
async fn test_sync_rejection() {
    let wallet = wallet();
    let address = wallet.address.clone();
    let node = Arc::new(MockNode::new(&address, 32, 1));
    let client = client_with(node.clone(), OfflineSigner::direct(wallet), &address);

    let err = client.broadcast(&[send_to(&address)], &options()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ChainRejection);
    match err {
        Error::BroadcastRejected { code, codespace, raw_log } => {
            assert_eq!(code, 32);
            assert_eq!(codespace, "sdk");
            assert_eq!(raw_log, "account sequence mismatch");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(node.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_confirmation_timeout() {
    let wallet = wallet();
    let address = wallet.address.clone();
    let node = Arc::new(MockNode::new(&address, 0, u32::MAX));
    let client = client_with(node.clone(), OfflineSigner::direct(wallet), &address);

    let opts = TxOptions {
        broadcast_timeout_ms: 30_000,
        ..options()
    };
    let err = client.broadcast(&[send_to(&address)], &opts).await.unwrap_err();
    assert!(err.is_unknown_outcome());
    assert_eq!(err.kind(), ErrorKind::ConfirmationTimeout);
    assert!(node.lookups.load(Ordering::SeqCst) >= 5);
}

#[tokio::test(start_paused = true)]
async fn test_amino_signer_path() {
    let wallet = wallet();
    let address = wallet.address.clone();
    let node = Arc::new(MockNode::new(&address, 0, 1));
    let client = client_with(node.clone(), OfflineSigner::amino(wallet), &address);

    let msg = MsgDelegate {
        delegator_address: address.clone(),
        validator_address: "mervaloper1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqkh6wzs".to_string(),
        amount: Coin::new(1_000_000u64, "alion"),
    };
    let tx = client
        .staking()
        .delegate()
        .broadcast(msg, &options())
        .await
        .unwrap()
        .committed()
        .unwrap();
    assert!(matches!(tx.tx.messages[0], TxMessage::Delegate(_)));

    let mode = tx.tx.auth_info.unwrap().signer_infos[0].mode_info.clone().unwrap();
    assert_eq!(
        mode.sum,
        Some(mode_info::Sum::Single(mode_info::Single {
            mode: SignMode::LegacyAminoJson as i32
        }))
    );
}

#[tokio::test]
async fn test_simulate_does_not_broadcast() {
    let wallet = wallet();
    let address = wallet.address.clone();
    let node = Arc::new(MockNode::new(&address, 0, 1));
    let client = client_with(node.clone(), OfflineSigner::direct(wallet), &address);

    let response = client.bank().send().simulate(send_to(&address), &options()).await.unwrap();
    assert_eq!(response.gas_info.unwrap().gas_used, 81_234);
    assert_eq!(node.simulations.load(Ordering::SeqCst), 1);
    assert!(node.broadcasts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_readonly_client_refuses_writes() {
    let node = Arc::new(MockNode::new("mer1nobody", 0, 1));
    let client = MerlionClient::readonly(node.clone(), "merlion_5000-101");

    let err = client.broadcast(&[send_to("mer1nobody")], &options()).await.unwrap_err();
    assert!(matches!(err, Error::ReadonlyModeUnsupported(_)));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(node.broadcasts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_account_fails_before_signing() {
    let wallet = wallet();
    let address = wallet.address.clone();
    let node = Arc::new(MockNode::new("mer1someoneelse", 0, 1));
    let client = client_with(node.clone(), OfflineSigner::direct(wallet), &address);

    let err = client.broadcast(&[send_to(&address)], &options()).await.unwrap_err();
    assert!(matches!(err, Error::AccountNotFound(ref a) if *a == address));
    assert!(node.broadcasts.lock().unwrap().is_empty());
}
