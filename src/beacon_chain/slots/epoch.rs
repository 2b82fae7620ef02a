use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialOrd, PartialEq, Serialize,
)]
pub struct Epoch(pub u64);

impl Epoch {
    pub fn sync_committee_period(&self, epochs_per_period: u64) -> SyncCommitteePeriod {
        SyncCommitteePeriod(self.0 / epochs_per_period)
    }
}

impl Display for Epoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Epoch {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// A run of `EPOCHS_PER_SYNC_COMMITTEE_PERIOD` epochs sharing one sync committee.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialOrd, PartialEq)]
pub struct SyncCommitteePeriod(pub u64);

impl SyncCommitteePeriod {
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn first_epoch(&self, epochs_per_period: u64) -> Epoch {
        Epoch(self.0 * epochs_per_period)
    }
}

impl Display for SyncCommitteePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialOrd, PartialEq, Serialize,
)]
pub struct ValidatorIndex(pub u64);

impl Display for ValidatorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ValidatorIndex {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_committee_period_test() {
        assert_eq!(Epoch(255).sync_committee_period(256), SyncCommitteePeriod(0));
        assert_eq!(Epoch(256).sync_committee_period(256), SyncCommitteePeriod(1));
        assert_eq!(
            Epoch(218_750).sync_committee_period(256),
            SyncCommitteePeriod(854)
        );
    }

    #[test]
    fn next_period_first_epoch_test() {
        let period = SyncCommitteePeriod(5);
        assert_eq!(period.next(), SyncCommitteePeriod(6));
        assert_eq!(period.next().first_epoch(256), Epoch(1536));
    }

    #[test]
    fn parse_test() {
        assert_eq!("1536".parse::<Epoch>().unwrap(), Epoch(1536));
        assert!("-1".parse::<Epoch>().is_err());
        assert_eq!("42".parse::<ValidatorIndex>().unwrap(), ValidatorIndex(42));
    }
}
