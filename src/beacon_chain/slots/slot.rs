use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt::Display, str::FromStr};

use super::Epoch;

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialOrd, PartialEq, Serialize,
)]
pub struct Slot(pub u64);

impl Slot {
    pub const GENESIS: Self = Self(0);

    pub fn epoch(&self, slots_per_epoch: u64) -> Epoch {
        Epoch(self.0 / slots_per_epoch)
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Slot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

// the beacon API quotes every integer
pub fn slot_from_string<'de, D>(deserializer: D) -> Result<Slot, D::Error>
where
    D: Deserializer<'de>,
{
    let slot_text = String::deserialize(deserializer)?;
    slot_text.parse().map_err(serde::de::Error::custom)
}
