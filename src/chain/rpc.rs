use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::Code;

use crate::chain::broadcast::BroadcastMode;
use crate::chain::error::Result;
use crate::chain::queries::Querier;
use crate::chain::proto::{
    Any, AuthQueryClient, BroadcastTxRequest, GetTxsEventRequest, QueryAccountRequest,
    ServiceClient, SimulateRequest, SimulateResponse, TxResponse,
};

/// Network operations the transaction lifecycle depends on.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Raw account record, `None` if the chain has no account at `address`.
    async fn account(&self, address: &str) -> Result<Option<Any>>;

    async fn simulate(&self, tx_bytes: Vec<u8>) -> Result<SimulateResponse>;

    /// Submit signed bytes. `None` if the node answered without a tx response.
    async fn broadcast_tx(&self, tx_bytes: Vec<u8>, mode: BroadcastMode) -> Result<Option<TxResponse>>;

    async fn get_txs_event(&self, events: Vec<String>) -> Result<Vec<TxResponse>>;
}

/// Configuration for the gRPC transport
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// gRPC endpoint URL (e.g., "http://localhost:9090")
    pub grpc_endpoint: String,
    /// Connection timeout in seconds
    pub connection_timeout: u64,
    /// Request timeout in seconds
    pub request_timeout: u64,
    /// Maximum retry attempts for read-only calls
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            grpc_endpoint: "http://localhost:9090".to_string(),
            connection_timeout: 10,
            request_timeout: 30,
            max_retries: 3,
        }
    }
}

/// `ChainRpc` over a tonic channel.
#[derive(Clone)]
pub struct GrpcRpc {
    config: ClientConfig,
    channel: Channel,
}

/// Statuses worth another attempt on an idempotent call.
fn is_transient(status: &tonic::Status) -> bool {
    matches!(
        status.code(),
        Code::Unavailable | Code::DeadlineExceeded | Code::ResourceExhausted
    )
}

/// Split a `key='value' AND key='value'` query into event predicates.
pub fn split_query(query: &str) -> Vec<String> {
    query
        .split(" AND ")
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect()
}

impl GrpcRpc {
    /// Connect to the gRPC endpoint
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        log::info!("Connecting to {}", config.grpc_endpoint);

        let mut endpoint = Endpoint::from_shared(config.grpc_endpoint.clone())?
            .timeout(Duration::from_secs(config.request_timeout))
            .connect_timeout(Duration::from_secs(config.connection_timeout));
        if config.grpc_endpoint.starts_with("https://") {
            endpoint = endpoint.tls_config(ClientTlsConfig::new())?;
        }

        let channel = endpoint.connect().await?;
        log::info!("Connected to {}", config.grpc_endpoint);

        Ok(Self { config, channel })
    }

    /// Build over an existing channel, e.g. a lazily connected one.
    pub fn with_channel(config: ClientConfig, channel: Channel) -> Self {
        Self { config, channel }
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Typed module query clients sharing this connection.
    pub fn querier(&self) -> Querier {
        Querier::new(self.channel.clone())
    }

    /// Retry helper for idempotent network operations
    async fn with_retry<T, F, Fut>(&self, f: F) -> std::result::Result<T, tonic::Status>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, tonic::Status>>,
    {
        let mut retries = 0;
        loop {
            match f().await {
                Ok(result) => return Ok(result),
                Err(status) if is_transient(&status) && retries < self.config.max_retries => {
                    retries += 1;
                    log::debug!("Transient gRPC failure ({}), retry {}", status.code(), retries);
                    tokio::time::sleep(Duration::from_millis(100 * retries as u64)).await;
                }
                Err(status) => return Err(status),
            }
        }
    }
}

#[async_trait]
impl ChainRpc for GrpcRpc {
    async fn account(&self, address: &str) -> Result<Option<Any>> {
        let response = self
            .with_retry(|| async {
                let mut client = AuthQueryClient::new(self.channel.clone());
                let request = tonic::Request::new(QueryAccountRequest {
                    address: address.to_string(),
                });
                client.account(request).await
            })
            .await;

        match response {
            Ok(response) => Ok(response.into_inner().account),
            Err(status) if status.code() == Code::NotFound => {
                log::debug!("No account on chain for {}", address);
                Ok(None)
            }
            Err(status) => Err(status.into()),
        }
    }

    async fn simulate(&self, tx_bytes: Vec<u8>) -> Result<SimulateResponse> {
        let response = self
            .with_retry(|| async {
                let mut client = ServiceClient::new(self.channel.clone());
                let request = tonic::Request::new(SimulateRequest {
                    tx_bytes: tx_bytes.clone(),
                    ..Default::default()
                });
                client.simulate(request).await
            })
            .await?;
        Ok(response.into_inner())
    }

    async fn broadcast_tx(&self, tx_bytes: Vec<u8>, mode: BroadcastMode) -> Result<Option<TxResponse>> {
        log::debug!("broadcast_tx called with {} bytes ({:?})", tx_bytes.len(), mode);
        let mut client = ServiceClient::new(self.channel.clone());
        let request = tonic::Request::new(BroadcastTxRequest {
            tx_bytes,
            mode: mode.as_proto() as i32,
        });
        let response = client.broadcast_tx(request).await?;
        Ok(response.into_inner().tx_response)
    }

    async fn get_txs_event(&self, events: Vec<String>) -> Result<Vec<TxResponse>> {
        let response = self
            .with_retry(|| async {
                let mut client = ServiceClient::new(self.channel.clone());
                let request = tonic::Request::new(GetTxsEventRequest {
                    events: events.clone(),
                    ..Default::default()
                });
                client.get_txs_event(request).await
            })
            .await?;
        Ok(response.into_inner().tx_responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn lazy_rpc(max_retries: u32) -> GrpcRpc {
        let config = ClientConfig {
            max_retries,
            ..ClientConfig::default()
        };
        let channel = Endpoint::from_static("http://127.0.0.1:1").connect_lazy();
        GrpcRpc::with_channel(config, channel)
    }

    #[test]
    fn test_split_query() {
        assert_eq!(split_query("tx.hash='AB'"), vec!["tx.hash='AB'"]);
        assert_eq!(
            split_query("message.sender='mer1a' AND  tx.height='5' "),
            vec!["message.sender='mer1a'", "tx.height='5'"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_only_transient_statuses() {
        let rpc = lazy_rpc(3);

        let calls = AtomicU32::new(0);
        let result: std::result::Result<(), _> = rpc
            .with_retry(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(tonic::Status::unavailable("node down"))
            })
            .await;
        assert_eq!(result.unwrap_err().code(), Code::Unavailable);
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let calls = AtomicU32::new(0);
        let result: std::result::Result<(), _> = rpc
            .with_retry(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(tonic::Status::invalid_argument("bad tx"))
            })
            .await;
        assert_eq!(result.unwrap_err().code(), Code::InvalidArgument);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_querier_shares_the_channel() {
        use crate::chain::client::MerlionClient;

        let rpc = lazy_rpc(0);
        let querier = rpc.querier();
        let _ = querier.staking();
        let _ = querier.tendermint();

        let client = MerlionClient::readonly(std::sync::Arc::new(rpc), "merlion_5000-101");
        assert!(client.query().is_none());
        let client = client.with_querier(querier);
        let _ = client.query().unwrap().gov();
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers() {
        let rpc = lazy_rpc(2);
        let calls = AtomicU32::new(0);
        let result = rpc
            .with_retry(|| async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(tonic::Status::deadline_exceeded("slow"))
                } else {
                    Ok(7u64)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
    }
}
