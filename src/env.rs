//! Configuration read from the process environment, and the connection settings built from it.
use lazy_static::lazy_static;
use std::time::Duration;
use tracing::debug;

/// Public mainnet endpoint used when no connection is supplied.
pub const DEFAULT_BEACON_NODE: &str = "http://mainnet-consensus.attestant.io/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
pub struct EnvConfig {
    pub beacon_url: Option<String>,
    pub log_json: bool,
}

fn get_env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn get_env_bool(key: &str) -> bool {
    get_env_var(key)
        .map(|value| matches!(value.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

pub fn get_env_config() -> EnvConfig {
    EnvConfig {
        beacon_url: get_env_var("BEACON_URL"),
        log_json: get_env_bool("LOG_JSON"),
    }
}

lazy_static! {
    pub static ref ENV_CONFIG: EnvConfig = get_env_config();
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionConfig {
    /// Node the user asked for. `None` means the fallback may be used.
    pub connection: Option<String>,
    pub fallback_connection: String,
    pub timeout: Duration,
    pub allow_insecure_connections: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connection: None,
            fallback_connection: DEFAULT_BEACON_NODE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            allow_insecure_connections: false,
        }
    }
}

impl ConnectionConfig {
    /// An empty connection counts as no connection; `BEACON_URL` fills in when the flag is absent.
    pub fn new(
        connection: Option<String>,
        env_config: &EnvConfig,
        timeout: Duration,
        allow_insecure_connections: bool,
    ) -> Self {
        let connection = connection
            .filter(|connection| !connection.is_empty())
            .or_else(|| env_config.beacon_url.clone());
        debug!(?connection, ?timeout, "connection config");

        Self {
            connection,
            timeout,
            allow_insecure_connections,
            ..Self::default()
        }
    }
}
