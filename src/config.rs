//! Configuration module for the order reconciler
//!
//! Values are layered: built-in defaults, then an optional config file
//! (`CONFIG_FILE`, default `reconciler.toml`), then environment variables
//! such as `WS_ENDPOINT` or `BASE_CLIENT_ID`.

use serde::Deserialize;
use std::env;

use crate::engine::ModifyPolicy;
use crate::error::Result;

const DEFAULT_WS_ENDPOINT: &str = "ws://localhost:8085";
const DEFAULT_BASE_CLIENT_ID: u64 = 95_055_780;
const DEFAULT_FEED_BIND_ADDR: &str = "0.0.0.0:8085";

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// WebSocket endpoint delivering order updates
    pub ws_endpoint: String,

    /// Base for the two-way client ID bucket (`base + order_id % 2`)
    pub base_client_id: u64,

    /// Whether MODIFY re-checks the price type / status pair
    pub modify_policy: ModifyPolicy,

    /// Bound of the transport -> engine queue
    pub channel_capacity: usize,

    /// Reconnection settings
    pub reconnect_delay_ms: u64,
    pub max_reconnect_attempts: u32,

    /// Seconds without a frame before a keepalive ping
    pub recv_timeout_secs: u64,

    /// Unix socket for downstream order book sync; publishing is off when unset
    #[serde(default)]
    pub ipc_socket_path: Option<String>,

    /// Where to write the final JSON report, if anywhere
    #[serde(default)]
    pub report_path: Option<String>,

    /// Port of the health/metrics HTTP server
    pub health_port: u16,

    /// Listen address of the demo feed
    pub feed_bind_addr: String,

    /// Order script for the demo feed; the embedded sample is used when unset
    #[serde(default)]
    pub feed_script_path: Option<String>,

    /// Emit JSON log lines instead of plain text
    pub log_json: bool,
}

impl Config {
    /// Load configuration from defaults, optional file, and environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = env::var("CONFIG_FILE").unwrap_or_else(|_| "reconciler".to_string());

        let config = config::Config::builder()
            .set_default("ws_endpoint", DEFAULT_WS_ENDPOINT)?
            .set_default("base_client_id", DEFAULT_BASE_CLIENT_ID as i64)?
            .set_default("modify_policy", "strict")?
            .set_default("channel_capacity", 1024_i64)?
            .set_default("reconnect_delay_ms", 1000_i64)?
            .set_default("max_reconnect_attempts", 10_i64)?
            .set_default("recv_timeout_secs", 45_i64)?
            .set_default("health_port", 9090_i64)?
            .set_default("feed_bind_addr", DEFAULT_FEED_BIND_ADDR)?
            .set_default("log_json", false)?
            .add_source(config::File::with_name(&file).required(false))
            .add_source(config::Environment::default().try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Reconnect delay for the given attempt, doubling up to `2^6` times the base
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        self.reconnect_delay_ms * 2u64.pow(attempt.min(6))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ws_endpoint: DEFAULT_WS_ENDPOINT.to_string(),
            base_client_id: DEFAULT_BASE_CLIENT_ID,
            modify_policy: ModifyPolicy::Strict,
            channel_capacity: 1024,
            reconnect_delay_ms: 1000,
            max_reconnect_attempts: 10,
            recv_timeout_secs: 45,
            ipc_socket_path: None,
            report_path: None,
            health_port: 9090,
            feed_bind_addr: DEFAULT_FEED_BIND_ADDR.to_string(),
            feed_script_path: None,
            log_json: false,
        }
    }
}
