use anyhow::{Context, Result};
use std::io::Write;
use tracing::debug;

use super::{connection::connect_with_fallback, OutputFlags};
use crate::beacon_chain::Connector;
use crate::env::ConnectionConfig;

#[derive(Clone, Debug)]
pub struct NodeInfoRequest {
    pub connection: ConnectionConfig,
    pub flags: OutputFlags,
}

/// Reports the version (verbose only) and sync state of a beacon node.
///
/// In quiet mode nothing is printed, success only tells the caller the node could be reached.
pub async fn node_info(
    request: &NodeInfoRequest,
    connector: &dyn Connector,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    let beacon_service =
        connect_with_fallback(&request.connection, connector, &request.flags, err).await?;

    if request.flags.quiet {
        return Ok(());
    }

    if request.flags.verbose {
        let version = beacon_service
            .require_node_version()?
            .node_version()
            .await
            .context("failed to obtain node version")?;
        writeln!(out, "Version: {}", version.version)?;
    }

    let syncing = beacon_service
        .require_node_syncing()?
        .node_syncing()
        .await
        .context("failed to obtain node sync state")?;
    debug!(
        head_slot = %syncing.head_slot,
        sync_distance = syncing.sync_distance,
        "node sync state"
    );
    writeln!(out, "Syncing: {}", !syncing.is_synced())?;

    Ok(())
}
