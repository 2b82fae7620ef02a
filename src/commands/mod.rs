//! Command line surface. Handlers return results; exit codes are decided by the binary.
pub mod connection;
pub mod node_info;
pub mod sync_committee;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::beacon_chain::HttpConnector;
use crate::env::{ConnectionConfig, ENV_CONFIG};
use node_info::{node_info, NodeInfoRequest};
use sync_committee::members::{self, MembersCommand, EPOCH_UNSET};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputFlags {
    pub debug: bool,
    pub quiet: bool,
    pub verbose: bool,
}

#[derive(Parser, Debug)]
#[command(name = "beacon", version, about = "Query beacon nodes for status and sync committee information")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// URL of the beacon node, falls back to BEACON_URL and then to a public mainnet endpoint
    #[arg(long, global = true)]
    pub connection: Option<String>,
    /// Timeout for beacon node requests, e.g. 30s or 2m; a bare number is seconds
    #[arg(
        long,
        global = true,
        default_value = "30s",
        value_name = "DURATION",
        value_parser = parse_timeout
    )]
    pub timeout: Duration,
    /// Allow plain http connections to remote beacon nodes without a warning
    #[arg(long, global = true)]
    pub allow_insecure_connections: bool,
    #[arg(long, global = true)]
    pub debug: bool,
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn flags(&self) -> OutputFlags {
        OutputFlags {
            debug: self.debug,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::new(
            self.connection.clone(),
            &ENV_CONFIG,
            self.timeout,
            self.allow_insecure_connections,
        )
    }
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    let timeout = match value.parse::<u64>() {
        Ok(seconds) => Duration::from_secs(seconds),
        Err(_) => humantime::parse_duration(value).map_err(|err| err.to_string())?,
    };

    if timeout.is_zero() {
        return Err("timeout must be greater than zero".to_string());
    }

    Ok(timeout)
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Commands for beacon nodes
    #[command(subcommand)]
    Node(NodeCommand),
    /// Commands for sync committees
    #[command(name = "synccommittee")]
    #[command(subcommand)]
    SyncCommittee(SyncCommitteeCommand),
}

#[derive(Subcommand, Debug)]
pub enum NodeCommand {
    /// Obtain information about a node. In quiet mode only the exit code reports whether the node could be reached
    Info,
}

#[derive(Subcommand, Debug)]
pub enum SyncCommitteeCommand {
    /// List the validator indices of a sync committee
    Members(MembersArgs),
}

#[derive(Args, Debug)]
pub struct MembersArgs {
    /// Epoch for which to fetch the sync committee, -1 for none
    #[arg(long, default_value_t = EPOCH_UNSET, allow_hyphen_values = true)]
    pub epoch: i64,
    /// Sync committee period when no epoch is given: current or next
    #[arg(long, default_value = "")]
    pub period: String,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let flags = self.global.flags();
        let connection = self.global.connection_config();
        let connector = HttpConnector;
        let mut stdout = std::io::stdout();
        let mut stderr = std::io::stderr();

        match self.command {
            Command::Node(NodeCommand::Info) => {
                let request = NodeInfoRequest { connection, flags };
                node_info(&request, &connector, &mut stdout, &mut stderr).await
            }
            Command::SyncCommittee(SyncCommitteeCommand::Members(args)) => {
                let command = MembersCommand {
                    epoch: args.epoch,
                    period: args.period,
                    connection,
                    flags,
                };
                members::run(&command, &connector, &mut stdout, &mut stderr).await
            }
        }
    }
}
