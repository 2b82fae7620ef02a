use anyhow::anyhow;
use beacon_cli::{commands::Cli, log::init_tracing_subscriber};
use clap::Parser;
use std::process::ExitCode;
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing_subscriber(cli.global.debug);

    let result = tokio::select! {
        result = cli.run() => result,
        _ = tokio::signal::ctrl_c() => Err(anyhow!("cancelled")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(?err, "command failed");
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
