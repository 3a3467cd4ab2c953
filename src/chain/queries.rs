/// Read-only module queries
///
/// `Querier` hands out the typed `cosmos-sdk-proto` query clients for every
/// standard module over one shared channel. The helpers below cover the
/// lookups the CLI needs.

use cosmos_sdk_proto::cosmos::bank::v1beta1::{QueryAllBalancesRequest, QueryBalanceRequest};
use tonic::transport::Channel;

use crate::chain::error::Result;
use crate::chain::messages::Coin;

pub type AuthQueryClient = cosmos_sdk_proto::cosmos::auth::v1beta1::query_client::QueryClient<Channel>;
pub type AuthzQueryClient = cosmos_sdk_proto::cosmos::authz::v1beta1::query_client::QueryClient<Channel>;
pub type BankQueryClient = cosmos_sdk_proto::cosmos::bank::v1beta1::query_client::QueryClient<Channel>;
pub type DistributionQueryClient =
    cosmos_sdk_proto::cosmos::distribution::v1beta1::query_client::QueryClient<Channel>;
pub type EvidenceQueryClient = cosmos_sdk_proto::cosmos::evidence::v1beta1::query_client::QueryClient<Channel>;
pub type FeegrantQueryClient = cosmos_sdk_proto::cosmos::feegrant::v1beta1::query_client::QueryClient<Channel>;
pub type GovQueryClient = cosmos_sdk_proto::cosmos::gov::v1beta1::query_client::QueryClient<Channel>;
pub type MintQueryClient = cosmos_sdk_proto::cosmos::mint::v1beta1::query_client::QueryClient<Channel>;
pub type ParamsQueryClient = cosmos_sdk_proto::cosmos::params::v1beta1::query_client::QueryClient<Channel>;
pub type SlashingQueryClient = cosmos_sdk_proto::cosmos::slashing::v1beta1::query_client::QueryClient<Channel>;
pub type StakingQueryClient = cosmos_sdk_proto::cosmos::staking::v1beta1::query_client::QueryClient<Channel>;
pub type TendermintQueryClient =
    cosmos_sdk_proto::cosmos::base::tendermint::v1beta1::service_client::ServiceClient<Channel>;
pub type UpgradeQueryClient = cosmos_sdk_proto::cosmos::upgrade::v1beta1::query_client::QueryClient<Channel>;

/// Typed query clients for the standard modules.
///
/// Clients are cheap to create (they clone the channel), so every accessor
/// returns a fresh one ready for `&mut` calls.
#[derive(Debug, Clone)]
pub struct Querier {
    channel: Channel,
}

impl Querier {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn auth(&self) -> AuthQueryClient {
        AuthQueryClient::new(self.channel.clone())
    }

    pub fn authz(&self) -> AuthzQueryClient {
        AuthzQueryClient::new(self.channel.clone())
    }

    pub fn bank(&self) -> BankQueryClient {
        BankQueryClient::new(self.channel.clone())
    }

    pub fn distribution(&self) -> DistributionQueryClient {
        DistributionQueryClient::new(self.channel.clone())
    }

    pub fn evidence(&self) -> EvidenceQueryClient {
        EvidenceQueryClient::new(self.channel.clone())
    }

    pub fn feegrant(&self) -> FeegrantQueryClient {
        FeegrantQueryClient::new(self.channel.clone())
    }

    pub fn gov(&self) -> GovQueryClient {
        GovQueryClient::new(self.channel.clone())
    }

    pub fn mint(&self) -> MintQueryClient {
        MintQueryClient::new(self.channel.clone())
    }

    pub fn params(&self) -> ParamsQueryClient {
        ParamsQueryClient::new(self.channel.clone())
    }

    pub fn slashing(&self) -> SlashingQueryClient {
        SlashingQueryClient::new(self.channel.clone())
    }

    pub fn staking(&self) -> StakingQueryClient {
        StakingQueryClient::new(self.channel.clone())
    }

    /// Node and block info (`cosmos.base.tendermint.v1beta1.Service`).
    pub fn tendermint(&self) -> TendermintQueryClient {
        TendermintQueryClient::new(self.channel.clone())
    }

    pub fn upgrade(&self) -> UpgradeQueryClient {
        UpgradeQueryClient::new(self.channel.clone())
    }
}

/// Balance of one denom; `None` when the node reports no balance entry.
pub async fn query_balance(querier: &Querier, address: &str, denom: &str) -> Result<Option<Coin>> {
    let request = tonic::Request::new(QueryBalanceRequest {
        address: address.to_string(),
        denom: denom.to_string(),
    });
    let response = querier.bank().balance(request).await?.into_inner();

    log::debug!("Balance of {} in {}: {:?}", address, denom, response.balance);
    Ok(response.balance.map(Coin::from))
}

/// All balances of an account (first page).
pub async fn query_all_balances(querier: &Querier, address: &str) -> Result<Vec<Coin>> {
    let request = tonic::Request::new(QueryAllBalancesRequest {
        address: address.to_string(),
        ..Default::default()
    });
    let response = querier.bank().all_balances(request).await?.into_inner();

    log::debug!("{} holds {} denoms", address, response.balances.len());
    Ok(response.balances.into_iter().map(Coin::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::error::{Error, ErrorKind};
    use tonic::transport::Endpoint;

    fn lazy_querier() -> Querier {
        Querier::new(Endpoint::from_static("http://127.0.0.1:1").connect_lazy())
    }

    #[tokio::test]
    async fn test_every_module_client_builds_over_one_channel() {
        let querier = lazy_querier();
        let _ = querier.auth();
        let _ = querier.authz();
        let _ = querier.bank();
        let _ = querier.distribution();
        let _ = querier.evidence();
        let _ = querier.feegrant();
        let _ = querier.gov();
        let _ = querier.mint();
        let _ = querier.params();
        let _ = querier.slashing();
        let _ = querier.staking();
        let _ = querier.tendermint();
        let _ = querier.upgrade();
    }

    #[tokio::test]
    async fn test_balance_query_surfaces_network_error() {
        let querier = lazy_querier();
        let err = query_balance(&querier, "mer1nobody", "alion").await.unwrap_err();
        assert!(matches!(err, Error::Rpc(_)));
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}
