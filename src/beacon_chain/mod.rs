pub mod chain_time;
pub mod node;
mod slots;

use chrono::{DateTime, TimeZone, Utc};
use lazy_static::lazy_static;

pub use chain_time::{ChainTime, ChainTimeService};
pub use node::{BeaconNodeHttp, BeaconService, Connector, HttpConnector};
pub use slots::{slot_from_string, Epoch, Slot, SyncCommitteePeriod, ValidatorIndex};

lazy_static! {
    pub static ref GENESIS_TIMESTAMP: DateTime<Utc> = Utc.timestamp_opt(1606824023, 0).unwrap();
}

/// State identifier for the most recent state known to a node.
pub const HEAD_STATE_ID: &str = "head";
