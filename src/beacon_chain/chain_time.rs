//! Conversions between wall-clock time, slots, epochs and sync-committee periods.
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mockall::automock;
use thiserror::Error;
use tracing::debug;

use super::{
    node::{BeaconNodeError, BeaconService},
    Epoch, Slot, SyncCommitteePeriod, GENESIS_TIMESTAMP,
};

pub const MAINNET_SECONDS_PER_SLOT: u64 = 12;
pub const MAINNET_SLOTS_PER_EPOCH: u64 = 32;
pub const MAINNET_EPOCHS_PER_SYNC_COMMITTEE_PERIOD: u64 = 256;
pub const MAINNET_ALTAIR_FORK_EPOCH: Epoch = Epoch(74240);

#[derive(Debug, Error)]
pub enum ChainTimeError {
    #[error("{0} must be greater than zero")]
    ZeroParameter(&'static str),
    #[error("genesis time {0} is out of range")]
    InvalidGenesisTime(u64),
}

#[automock]
pub trait ChainTime: Send + Sync {
    fn current_slot(&self) -> Slot;
    fn current_epoch(&self) -> Epoch;
    fn slot_to_epoch(&self, slot: Slot) -> Epoch;
    fn slot_to_sync_committee_period(&self, slot: Slot) -> SyncCommitteePeriod;
    fn epoch_to_sync_committee_period(&self, epoch: Epoch) -> SyncCommitteePeriod;
    fn first_epoch_of_sync_period(&self, period: SyncCommitteePeriod) -> Epoch;
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChainTimeService {
    genesis_time: DateTime<Utc>,
    seconds_per_slot: u64,
    slots_per_epoch: u64,
    epochs_per_sync_committee_period: u64,
    altair_fork_epoch: Epoch,
}

impl ChainTimeService {
    pub fn new(
        genesis_time: DateTime<Utc>,
        seconds_per_slot: u64,
        slots_per_epoch: u64,
        epochs_per_sync_committee_period: u64,
        altair_fork_epoch: Epoch,
    ) -> Result<Self, ChainTimeError> {
        if seconds_per_slot == 0 {
            return Err(ChainTimeError::ZeroParameter("SECONDS_PER_SLOT"));
        }
        if slots_per_epoch == 0 {
            return Err(ChainTimeError::ZeroParameter("SLOTS_PER_EPOCH"));
        }
        if epochs_per_sync_committee_period == 0 {
            return Err(ChainTimeError::ZeroParameter(
                "EPOCHS_PER_SYNC_COMMITTEE_PERIOD",
            ));
        }

        Ok(Self {
            genesis_time,
            seconds_per_slot,
            slots_per_epoch,
            epochs_per_sync_committee_period,
            altair_fork_epoch,
        })
    }

    pub fn mainnet() -> Self {
        Self {
            genesis_time: *GENESIS_TIMESTAMP,
            seconds_per_slot: MAINNET_SECONDS_PER_SLOT,
            slots_per_epoch: MAINNET_SLOTS_PER_EPOCH,
            epochs_per_sync_committee_period: MAINNET_EPOCHS_PER_SYNC_COMMITTEE_PERIOD,
            altair_fork_epoch: MAINNET_ALTAIR_FORK_EPOCH,
        }
    }

    /// Builds chain time from the genesis and spec reported by a connected node.
    pub async fn from_beacon_service(beacon_service: &dyn BeaconService) -> Result<Self> {
        let genesis = beacon_service
            .require_genesis()?
            .genesis()
            .await
            .context("failed to obtain genesis")?;
        let spec = beacon_service
            .require_spec()?
            .spec()
            .await
            .context("failed to obtain chain spec")?;

        let genesis_time = genesis
            .genesis_date_time()
            .ok_or(ChainTimeError::InvalidGenesisTime(genesis.genesis_time))?;

        // nodes without Altair configured have no sync committees at all
        let altair_fork_epoch = match spec.u64_value("ALTAIR_FORK_EPOCH") {
            Ok(epoch) => Epoch(epoch),
            Err(BeaconNodeError::MissingSpecValue(_)) => Epoch(u64::MAX),
            Err(err) => return Err(err.into()),
        };

        let chain_time = Self::new(
            genesis_time,
            spec.u64_value("SECONDS_PER_SLOT")?,
            spec.u64_value("SLOTS_PER_EPOCH")?,
            spec.u64_value("EPOCHS_PER_SYNC_COMMITTEE_PERIOD")?,
            altair_fork_epoch,
        )?;
        debug!(?chain_time, "chain time ready");

        Ok(chain_time)
    }

    /// The slot in progress at `date_time`, genesis for any time before genesis.
    pub fn slot_at(&self, date_time: &DateTime<Utc>) -> Slot {
        if *date_time < self.genesis_time {
            return Slot::GENESIS;
        }

        let seconds_since_genesis = (*date_time - self.genesis_time).num_seconds() as u64;
        Slot(seconds_since_genesis / self.seconds_per_slot)
    }

    pub fn epoch_at(&self, date_time: &DateTime<Utc>) -> Epoch {
        self.slot_to_epoch(self.slot_at(date_time))
    }
}

impl ChainTime for ChainTimeService {
    fn current_slot(&self) -> Slot {
        self.slot_at(&Utc::now())
    }

    fn current_epoch(&self) -> Epoch {
        self.epoch_at(&Utc::now())
    }

    fn slot_to_epoch(&self, slot: Slot) -> Epoch {
        slot.epoch(self.slots_per_epoch)
    }

    fn slot_to_sync_committee_period(&self, slot: Slot) -> SyncCommitteePeriod {
        self.epoch_to_sync_committee_period(self.slot_to_epoch(slot))
    }

    fn epoch_to_sync_committee_period(&self, epoch: Epoch) -> SyncCommitteePeriod {
        epoch.sync_committee_period(self.epochs_per_sync_committee_period)
    }

    fn first_epoch_of_sync_period(&self, period: SyncCommitteePeriod) -> Epoch {
        period
            .first_epoch(self.epochs_per_sync_committee_period)
            .max(self.altair_fork_epoch)
    }
}
