use super::{
    BeaconService, GenesisProvider, MockGenesisProvider, MockNodeSyncingProvider,
    MockNodeVersionProvider, MockSpecProvider, MockSyncCommitteesProvider, NodeSyncingProvider,
    NodeVersionProvider, SpecProvider, SyncCommitteesProvider,
};

pub const MOCK_ADDRESS: &str = "http://localhost:5052";

/// A beacon service assembled from mocks. Capabilities left as `None` are reported as missing.
#[derive(Default)]
pub struct MockBeaconNode {
    pub node_version: Option<MockNodeVersionProvider>,
    pub node_syncing: Option<MockNodeSyncingProvider>,
    pub sync_committees: Option<MockSyncCommitteesProvider>,
    pub genesis: Option<MockGenesisProvider>,
    pub spec: Option<MockSpecProvider>,
}

impl MockBeaconNode {
    pub fn new() -> MockBeaconNode {
        Self::default()
    }
}

impl BeaconService for MockBeaconNode {
    fn address(&self) -> &str {
        MOCK_ADDRESS
    }

    fn node_version_provider(&self) -> Option<&dyn NodeVersionProvider> {
        self.node_version
            .as_ref()
            .map(|provider| provider as &dyn NodeVersionProvider)
    }

    fn node_syncing_provider(&self) -> Option<&dyn NodeSyncingProvider> {
        self.node_syncing
            .as_ref()
            .map(|provider| provider as &dyn NodeSyncingProvider)
    }

    fn sync_committees_provider(&self) -> Option<&dyn SyncCommitteesProvider> {
        self.sync_committees
            .as_ref()
            .map(|provider| provider as &dyn SyncCommitteesProvider)
    }

    fn genesis_provider(&self) -> Option<&dyn GenesisProvider> {
        self.genesis
            .as_ref()
            .map(|provider| provider as &dyn GenesisProvider)
    }

    fn spec_provider(&self) -> Option<&dyn SpecProvider> {
        self.spec.as_ref().map(|provider| provider as &dyn SpecProvider)
    }
}
