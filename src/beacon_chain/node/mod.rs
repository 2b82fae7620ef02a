//! Data structures and capability traits used to talk to a beacon node.
//!
//! A connected node is a [`BeaconService`]. What it can answer is resolved once, at connection
//! time, and queried through the `*_provider` accessors before any call is made.
mod http;
#[cfg(test)]
pub mod mock_beacon_node;

pub use http::{BeaconNodeHttp, HttpConnector};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mockall::automock;
use serde::Deserialize;
use std::{collections::HashMap, sync::Arc, time::Duration};
use thiserror::Error;

use super::{slot_from_string, Epoch, Slot, ValidatorIndex};
use crate::json_codecs::{nested_vec_from_strings, u64_from_string, vec_from_strings};

pub const NODE_VERSION: &str = "node version";
pub const NODE_SYNCING: &str = "node sync status";
pub const SYNC_COMMITTEES: &str = "sync committees";
pub const GENESIS: &str = "genesis";
pub const SPEC: &str = "chain spec";

#[derive(Debug, Error)]
pub enum BeaconNodeError {
    #[error("no address supplied")]
    NoAddress,
    #[error("invalid beacon node address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("beacon node does not provide {0}")]
    CapabilityMissing(&'static str),
    #[error("chain spec does not contain {0}")]
    MissingSpecValue(String),
    #[error("chain spec value {key} is not an unsigned integer: {value}")]
    InvalidSpecValue { key: String, value: String },
}

#[derive(Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NodeVersion {
    pub version: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NodeSyncing {
    #[serde(deserialize_with = "slot_from_string")]
    pub head_slot: Slot,
    #[serde(deserialize_with = "u64_from_string")]
    pub sync_distance: u64,
    pub is_syncing: bool,
    #[serde(default)]
    pub is_optimistic: bool,
    #[serde(default)]
    pub el_offline: bool,
}

impl NodeSyncing {
    pub fn is_synced(&self) -> bool {
        self.sync_distance == 0
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SyncCommittee {
    #[serde(deserialize_with = "vec_from_strings")]
    pub validators: Vec<ValidatorIndex>,
    #[serde(default, deserialize_with = "nested_vec_from_strings")]
    pub validator_aggregates: Vec<Vec<ValidatorIndex>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Genesis {
    #[serde(deserialize_with = "u64_from_string")]
    pub genesis_time: u64,
    pub genesis_validators_root: String,
    pub genesis_fork_version: String,
}

impl Genesis {
    pub fn genesis_date_time(&self) -> Option<DateTime<Utc>> {
        let seconds = i64::try_from(self.genesis_time).ok()?;
        Utc.timestamp_opt(seconds, 0).single()
    }
}

/// Configuration values reported by `/eth/v1/config/spec`, keyed by their upper-case names.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ChainSpec(pub HashMap<String, serde_json::Value>);

impl ChainSpec {
    pub fn u64_value(&self, key: &str) -> Result<u64, BeaconNodeError> {
        let value = self
            .0
            .get(key)
            .ok_or_else(|| BeaconNodeError::MissingSpecValue(key.to_string()))?;

        let parsed = match value {
            serde_json::Value::String(text) => text.parse().ok(),
            serde_json::Value::Number(number) => number.as_u64(),
            _ => None,
        };

        parsed.ok_or_else(|| BeaconNodeError::InvalidSpecValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

#[automock]
#[async_trait]
pub trait NodeVersionProvider: Send + Sync {
    async fn node_version(&self) -> Result<NodeVersion>;
}

#[automock]
#[async_trait]
pub trait NodeSyncingProvider: Send + Sync {
    async fn node_syncing(&self) -> Result<NodeSyncing>;
}

#[automock]
#[async_trait]
pub trait SyncCommitteesProvider: Send + Sync {
    /// Returns `None` when the node has no sync committee for the state and epoch.
    async fn sync_committee_at_epoch(
        &self,
        state_id: &str,
        epoch: Epoch,
    ) -> Result<Option<SyncCommittee>>;
}

#[automock]
#[async_trait]
pub trait GenesisProvider: Send + Sync {
    async fn genesis(&self) -> Result<Genesis>;
}

#[automock]
#[async_trait]
pub trait SpecProvider: Send + Sync {
    async fn spec(&self) -> Result<ChainSpec>;
}

pub trait BeaconService: Send + Sync {
    fn address(&self) -> &str;

    fn node_version_provider(&self) -> Option<&dyn NodeVersionProvider> {
        None
    }

    fn node_syncing_provider(&self) -> Option<&dyn NodeSyncingProvider> {
        None
    }

    fn sync_committees_provider(&self) -> Option<&dyn SyncCommitteesProvider> {
        None
    }

    fn genesis_provider(&self) -> Option<&dyn GenesisProvider> {
        None
    }

    fn spec_provider(&self) -> Option<&dyn SpecProvider> {
        None
    }

    fn require_node_version(&self) -> Result<&dyn NodeVersionProvider, BeaconNodeError> {
        self.node_version_provider()
            .ok_or(BeaconNodeError::CapabilityMissing(NODE_VERSION))
    }

    fn require_node_syncing(&self) -> Result<&dyn NodeSyncingProvider, BeaconNodeError> {
        self.node_syncing_provider()
            .ok_or(BeaconNodeError::CapabilityMissing(NODE_SYNCING))
    }

    fn require_sync_committees(&self) -> Result<&dyn SyncCommitteesProvider, BeaconNodeError> {
        self.sync_committees_provider()
            .ok_or(BeaconNodeError::CapabilityMissing(SYNC_COMMITTEES))
    }

    fn require_genesis(&self) -> Result<&dyn GenesisProvider, BeaconNodeError> {
        self.genesis_provider()
            .ok_or(BeaconNodeError::CapabilityMissing(GENESIS))
    }

    fn require_spec(&self) -> Result<&dyn SpecProvider, BeaconNodeError> {
        self.spec_provider()
            .ok_or(BeaconNodeError::CapabilityMissing(SPEC))
    }
}

/// Opens a connection to a beacon node.
#[automock]
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        address: &str,
        timeout: Duration,
        allow_insecure_connections: bool,
    ) -> Result<Arc<dyn BeaconService>>;
}
