use anyhow::Result;
use std::{io::Write, sync::Arc};
use tracing::info;

use super::OutputFlags;
use crate::beacon_chain::{BeaconService, Connector};
use crate::env::ConnectionConfig;

/// Connects to the configured node, or to the fallback endpoint when none was configured.
///
/// A connection the user asked for is never second-guessed: if it fails the error is returned
/// as is. Only when no connection was supplied is the fallback tried, once.
pub async fn connect_with_fallback(
    config: &ConnectionConfig,
    connector: &dyn Connector,
    flags: &OutputFlags,
    err: &mut dyn Write,
) -> Result<Arc<dyn BeaconService>> {
    if let Some(connection) = &config.connection {
        return connector
            .connect(connection, config.timeout, config.allow_insecure_connections)
            .await;
    }

    if flags.debug {
        writeln!(
            err,
            "No node connection, attempting to use {}",
            config.fallback_connection
        )?;
    }

    let beacon_service = connector
        .connect(
            &config.fallback_connection,
            config.timeout,
            config.allow_insecure_connections,
        )
        .await?;
    info!(address = %config.fallback_connection, "connected to fallback beacon node");

    if !flags.quiet {
        writeln!(
            err,
            "No connection supplied; using mainnet public access endpoint"
        )?;
    }

    Ok(beacon_service)
}
