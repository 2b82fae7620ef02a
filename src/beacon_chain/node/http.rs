use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::{sync::Arc, time::Duration};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::{
    BeaconNodeError, BeaconService, ChainSpec, Connector, DataEnvelope, Genesis,
    GenesisProvider, NodeSyncing, NodeSyncingProvider, NodeVersion, NodeVersionProvider,
    SpecProvider, SyncCommittee, SyncCommitteesProvider,
};
use crate::beacon_chain::Epoch;

/// A beacon node reached over the standard REST API. Provides every capability.
pub struct BeaconNodeHttp {
    address: String,
    client: reqwest::Client,
    // genesis never changes, the first answer is kept
    genesis: OnceCell<Genesis>,
}

impl BeaconNodeHttp {
    pub fn new(address: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build beacon node http client")?;

        Ok(Self {
            address: address.to_string(),
            client,
            genesis: OnceCell::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address.trim_end_matches('/'), path)
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "beacon node request");

        let envelope = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<DataEnvelope<T>>()
            .await?;

        Ok(envelope.data)
    }

    // some lookups are answered with a 404 when the node simply has nothing for the given id
    async fn get_optional_data<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = self.url(path);
        debug!(%url, "beacon node request");

        let res = self.client.get(&url).send().await?;

        if res.status() == StatusCode::NOT_FOUND {
            debug!(%url, "beacon node returned 404");
            return Ok(None);
        }

        let envelope = res.error_for_status()?.json::<DataEnvelope<T>>().await?;
        Ok(Some(envelope.data))
    }
}

#[async_trait]
impl NodeVersionProvider for BeaconNodeHttp {
    async fn node_version(&self) -> Result<NodeVersion> {
        self.get_data("/eth/v1/node/version").await
    }
}

#[async_trait]
impl NodeSyncingProvider for BeaconNodeHttp {
    async fn node_syncing(&self) -> Result<NodeSyncing> {
        self.get_data("/eth/v1/node/syncing").await
    }
}

#[async_trait]
impl SyncCommitteesProvider for BeaconNodeHttp {
    async fn sync_committee_at_epoch(
        &self,
        state_id: &str,
        epoch: Epoch,
    ) -> Result<Option<SyncCommittee>> {
        self.get_optional_data(&format!(
            "/eth/v1/beacon/states/{state_id}/sync_committees?epoch={epoch}"
        ))
        .await
    }
}

#[async_trait]
impl GenesisProvider for BeaconNodeHttp {
    async fn genesis(&self) -> Result<Genesis> {
        self.genesis
            .get_or_try_init(|| self.get_data("/eth/v1/beacon/genesis"))
            .await
            .cloned()
    }
}

#[async_trait]
impl SpecProvider for BeaconNodeHttp {
    async fn spec(&self) -> Result<ChainSpec> {
        self.get_data("/eth/v1/config/spec").await
    }
}

impl BeaconService for BeaconNodeHttp {
    fn address(&self) -> &str {
        &self.address
    }

    fn node_version_provider(&self) -> Option<&dyn NodeVersionProvider> {
        Some(self)
    }

    fn node_syncing_provider(&self) -> Option<&dyn NodeSyncingProvider> {
        Some(self)
    }

    fn sync_committees_provider(&self) -> Option<&dyn SyncCommitteesProvider> {
        Some(self)
    }

    fn genesis_provider(&self) -> Option<&dyn GenesisProvider> {
        Some(self)
    }

    fn spec_provider(&self) -> Option<&dyn SpecProvider> {
        Some(self)
    }
}

fn is_local_host(url: &Url) -> bool {
    matches!(
        url.host_str(),
        Some("localhost") | Some("127.0.0.1") | Some("[::1]")
    )
}

fn warrants_insecure_warning(url: &Url, allow_insecure_connections: bool) -> bool {
    !allow_insecure_connections && url.scheme() == "http" && !is_local_host(url)
}

fn parse_address(address: &str) -> Result<Url, BeaconNodeError> {
    if address.is_empty() {
        return Err(BeaconNodeError::NoAddress);
    }

    let url = Url::parse(address).map_err(|err| BeaconNodeError::InvalidAddress {
        address: address.to_string(),
        reason: err.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(BeaconNodeError::InvalidAddress {
            address: address.to_string(),
            reason: format!("unsupported scheme {scheme}"),
        }),
    }
}

/// Connects over http(s). A node only counts as connected once it has answered a genesis request.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpConnector;

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(
        &self,
        address: &str,
        timeout: Duration,
        allow_insecure_connections: bool,
    ) -> Result<Arc<dyn BeaconService>> {
        let url = parse_address(address)?;

        if warrants_insecure_warning(&url, allow_insecure_connections) {
            warn!(
                address,
                "connections to remote beacon nodes should be secure, this warning can be silenced with --allow-insecure-connections"
            );
        }

        let beacon_node = BeaconNodeHttp::new(address, timeout)?;
        let genesis = beacon_node
            .genesis()
            .await
            .with_context(|| format!("failed to connect to beacon node at {address}"))?;
        debug!(
            address,
            genesis_time = genesis.genesis_time,
            "connected to beacon node"
        );

        Ok(Arc::new(beacon_node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon_chain::{Slot, ValidatorIndex};
    use async_trait::async_trait;
    use mockito::{Matcher, ServerGuard};
    use test_context::{test_context, AsyncTestContext};

    const GENESIS_BODY: &str = r#"{"data":{"genesis_time":"1606824023","genesis_validators_root":"0x4b363db94e286120d76eb905340fdd4e54bfe9f06bf33ff6cf5ad27f511bfe95","genesis_fork_version":"0x00000000"}}"#;

    struct BeaconApi {
        server: ServerGuard,
    }

    #[async_trait]
    impl AsyncTestContext for BeaconApi {
        async fn setup() -> BeaconApi {
            BeaconApi {
                server: mockito::Server::new_async().await,
            }
        }
    }

    impl BeaconApi {
        fn beacon_node(&self) -> BeaconNodeHttp {
            BeaconNodeHttp::new(&self.server.url(), Duration::from_secs(5)).unwrap()
        }
    }

    #[test_context(BeaconApi)]
    #[tokio::test]
    async fn node_version_test(ctx: &mut BeaconApi) {
        let mock = ctx
            .server
            .mock("GET", "/eth/v1/node/version")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"version":"Lighthouse/v4.5.0-441fc16/x86_64-linux"}}"#)
            .create_async()
            .await;

        let version = ctx.beacon_node().node_version().await.unwrap();

        mock.assert_async().await;
        assert_eq!(version.version, "Lighthouse/v4.5.0-441fc16/x86_64-linux");
    }

    #[test_context(BeaconApi)]
    #[tokio::test]
    async fn node_syncing_test(ctx: &mut BeaconApi) {
        ctx.server
            .mock("GET", "/eth/v1/node/syncing")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":{"head_slot":"7100000","sync_distance":"3","is_syncing":true,"is_optimistic":false,"el_offline":false}}"#,
            )
            .create_async()
            .await;

        let syncing = ctx.beacon_node().node_syncing().await.unwrap();

        assert_eq!(syncing.head_slot, Slot(7100000));
        assert_eq!(syncing.sync_distance, 3);
        assert!(!syncing.is_synced());
    }

    #[test_context(BeaconApi)]
    #[tokio::test]
    async fn sync_committee_at_epoch_test(ctx: &mut BeaconApi) {
        let mock = ctx
            .server
            .mock("GET", "/eth/v1/beacon/states/head/sync_committees")
            .match_query(Matcher::UrlEncoded("epoch".into(), "1536".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"execution_optimistic":false,"finalized":false,"data":{"validators":["12","7","31"],"validator_aggregates":[["12","7"],["31"]]}}"#,
            )
            .create_async()
            .await;

        let committee = ctx
            .beacon_node()
            .sync_committee_at_epoch("head", Epoch(1536))
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            committee.validators,
            vec![ValidatorIndex(12), ValidatorIndex(7), ValidatorIndex(31)]
        );
    }

    #[test_context(BeaconApi)]
    #[tokio::test]
    async fn sync_committee_not_found_test(ctx: &mut BeaconApi) {
        ctx.server
            .mock("GET", "/eth/v1/beacon/states/head/sync_committees")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"code":404,"message":"NOT_FOUND: sync committee"}"#)
            .create_async()
            .await;

        let committee = ctx
            .beacon_node()
            .sync_committee_at_epoch("head", Epoch(10))
            .await
            .unwrap();

        assert!(committee.is_none());
    }

    #[test_context(BeaconApi)]
    #[tokio::test]
    async fn server_error_is_reported_test(ctx: &mut BeaconApi) {
        ctx.server
            .mock("GET", "/eth/v1/node/syncing")
            .with_status(500)
            .create_async()
            .await;

        assert!(ctx.beacon_node().node_syncing().await.is_err());
    }

    #[test_context(BeaconApi)]
    #[tokio::test]
    async fn spec_test(ctx: &mut BeaconApi) {
        ctx.server
            .mock("GET", "/eth/v1/config/spec")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":{"CONFIG_NAME":"mainnet","SECONDS_PER_SLOT":"12","SLOTS_PER_EPOCH":"32","EPOCHS_PER_SYNC_COMMITTEE_PERIOD":"256","ALTAIR_FORK_EPOCH":"74240"}}"#,
            )
            .create_async()
            .await;

        let spec = ctx.beacon_node().spec().await.unwrap();

        assert_eq!(spec.u64_value("ALTAIR_FORK_EPOCH").unwrap(), 74240);
    }

    #[test_context(BeaconApi)]
    #[tokio::test]
    async fn connect_test(ctx: &mut BeaconApi) {
        let mock = ctx
            .server
            .mock("GET", "/eth/v1/beacon/genesis")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(GENESIS_BODY)
            .create_async()
            .await;
        let address = format!("{}/", ctx.server.url());

        let beacon_service = HttpConnector
            .connect(&address, Duration::from_secs(5), false)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(beacon_service.address(), address);
        assert!(beacon_service.sync_committees_provider().is_some());
        assert!(beacon_service.node_version_provider().is_some());
    }

    #[test_context(BeaconApi)]
    #[tokio::test]
    async fn connect_reuses_genesis_test(ctx: &mut BeaconApi) {
        let mock = ctx
            .server
            .mock("GET", "/eth/v1/beacon/genesis")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(GENESIS_BODY)
            .expect(1)
            .create_async()
            .await;

        let beacon_service = HttpConnector
            .connect(&ctx.server.url(), Duration::from_secs(5), false)
            .await
            .unwrap();
        let genesis = beacon_service
            .require_genesis()
            .unwrap()
            .genesis()
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(genesis.genesis_time, 1606824023);
    }

    #[test_context(BeaconApi)]
    #[tokio::test]
    async fn connect_to_failing_node_test(ctx: &mut BeaconApi) {
        ctx.server
            .mock("GET", "/eth/v1/beacon/genesis")
            .with_status(503)
            .create_async()
            .await;

        let result = HttpConnector
            .connect(&ctx.server.url(), Duration::from_secs(5), false)
            .await;

        let message = result.err().unwrap().to_string();
        assert!(message.starts_with("failed to connect to beacon node at"));
    }

    #[tokio::test]
    async fn connect_rejects_bad_addresses_test() {
        let empty = HttpConnector.connect("", Duration::from_secs(1), false).await;
        assert_eq!(empty.err().unwrap().to_string(), "no address supplied");

        let unparseable = HttpConnector
            .connect("not a url", Duration::from_secs(1), false)
            .await;
        assert!(unparseable.is_err());

        let wrong_scheme = HttpConnector
            .connect("ws://localhost:5052", Duration::from_secs(1), false)
            .await;
        assert!(wrong_scheme
            .err()
            .unwrap()
            .to_string()
            .contains("unsupported scheme ws"));
    }

    #[test]
    fn is_local_host_test() {
        assert!(is_local_host(&Url::parse("http://localhost:5052").unwrap()));
        assert!(is_local_host(&Url::parse("http://127.0.0.1:5052/").unwrap()));
        assert!(!is_local_host(
            &Url::parse("http://mainnet-consensus.attestant.io/").unwrap()
        ));
    }

    #[test]
    fn insecure_warning_test() {
        let remote_http = Url::parse("http://mainnet-consensus.attestant.io/").unwrap();
        let remote_https = Url::parse("https://mainnet-consensus.attestant.io/").unwrap();
        let local_http = Url::parse("http://localhost:5052").unwrap();

        assert!(warrants_insecure_warning(&remote_http, false));
        assert!(!warrants_insecure_warning(&remote_http, true));
        assert!(!warrants_insecure_warning(&remote_https, false));
        assert!(!warrants_insecure_warning(&local_http, false));
        assert!(!warrants_insecure_warning(
            &Url::parse("http://127.0.0.1:5052").unwrap(),
            false
        ));
    }
}
