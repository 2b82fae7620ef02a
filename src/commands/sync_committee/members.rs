//! Resolves the epoch of interest and lists the sync committee active at it.
use anyhow::{Context, Result};
use std::{io::Write, str::FromStr};
use thiserror::Error;
use tracing::debug;

use crate::beacon_chain::{
    BeaconService, ChainTime, ChainTimeService, Connector, Epoch, ValidatorIndex, HEAD_STATE_ID,
};
use crate::commands::{connection::connect_with_fallback, OutputFlags};
use crate::env::ConnectionConfig;

/// Value of `--epoch` that means no epoch was given.
pub const EPOCH_UNSET: i64 = -1;

#[derive(Debug, Error, PartialEq)]
pub enum MembersError {
    #[error("no data")]
    NoData,
    #[error("period {0} not known")]
    UnknownPeriod(String),
    #[error("invalid epoch {0}")]
    InvalidEpoch(i64),
    #[error("no sync committee returned")]
    NoSyncCommittee,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeriodSelector {
    Current,
    Next,
}

impl FromStr for PeriodSelector {
    type Err = MembersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "current" => Ok(Self::Current),
            "next" => Ok(Self::Next),
            _ => Err(MembersError::UnknownPeriod(s.to_string())),
        }
    }
}

pub fn epoch_from_flag(epoch: i64) -> Result<Option<Epoch>, MembersError> {
    match epoch {
        EPOCH_UNSET => Ok(None),
        epoch if epoch < 0 => Err(MembersError::InvalidEpoch(epoch)),
        epoch => Ok(Some(Epoch(epoch as u64))),
    }
}

pub struct MembersRequest<'a> {
    pub epoch: Option<Epoch>,
    pub period: String,
    pub beacon_service: &'a dyn BeaconService,
    pub chain_time: &'a dyn ChainTime,
    pub flags: OutputFlags,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MembersResponse {
    pub flags: OutputFlags,
    pub validators: Vec<ValidatorIndex>,
}

// an explicit epoch always wins, the period is not even looked at
fn calculate_epoch(request: &MembersRequest<'_>, out: &mut dyn Write) -> Result<Epoch> {
    let epoch = match request.epoch {
        Some(epoch) => epoch,
        None => match request.period.parse::<PeriodSelector>()? {
            PeriodSelector::Current => request.chain_time.current_epoch(),
            PeriodSelector::Next => {
                let chain_time = request.chain_time;
                let period = chain_time.slot_to_sync_committee_period(chain_time.current_slot());
                chain_time.first_epoch_of_sync_period(period.next())
            }
        },
    };

    if request.flags.debug {
        writeln!(out, "epoch is {epoch}")?;
    }

    Ok(epoch)
}

pub async fn process(
    request: Option<&MembersRequest<'_>>,
    out: &mut dyn Write,
) -> Result<MembersResponse> {
    let request = request.ok_or(MembersError::NoData)?;

    let epoch = calculate_epoch(request, out)?;

    let sync_committee = request
        .beacon_service
        .require_sync_committees()?
        .sync_committee_at_epoch(HEAD_STATE_ID, epoch)
        .await
        .context("failed to obtain sync committee information")?
        .ok_or(MembersError::NoSyncCommittee)?;
    debug!(%epoch, members = sync_committee.validators.len(), "obtained sync committee");

    Ok(MembersResponse {
        flags: request.flags,
        validators: sync_committee.validators,
    })
}

pub fn output(response: Option<&MembersResponse>) -> Result<String> {
    let response = response.ok_or(MembersError::NoData)?;

    if response.flags.quiet {
        return Ok(String::new());
    }

    let mut lines: Vec<String> = response
        .validators
        .iter()
        .map(ValidatorIndex::to_string)
        .collect();
    if response.flags.verbose {
        lines.push(format!("Members: {}", response.validators.len()));
    }

    Ok(lines.join("\n"))
}

#[derive(Clone, Debug)]
pub struct MembersCommand {
    pub epoch: i64,
    pub period: String,
    pub connection: ConnectionConfig,
    pub flags: OutputFlags,
}

/// Connects, builds chain time from the node, resolves the committee and prints it.
pub async fn run(
    command: &MembersCommand,
    connector: &dyn Connector,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    let epoch = epoch_from_flag(command.epoch)?;

    let beacon_service =
        connect_with_fallback(&command.connection, connector, &command.flags, err).await?;
    let chain_time = ChainTimeService::from_beacon_service(beacon_service.as_ref()).await?;

    let request = MembersRequest {
        epoch,
        period: command.period.clone(),
        beacon_service: beacon_service.as_ref(),
        chain_time: &chain_time,
        flags: command.flags,
    };
    let response = process(Some(&request), out).await?;

    let text = output(Some(&response))?;
    if !text.is_empty() {
        writeln!(out, "{text}")?;
    }

    Ok(())
}
