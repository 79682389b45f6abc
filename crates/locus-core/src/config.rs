use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_CONFIG_PATH: &str = "locus.toml";
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 64; // queued frames per subscriber before drops
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024; // 1 MB ingress body cap
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30; // WS ping cadence, 0 disables

/// Top-level config (locus.toml + LOCUS_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocusConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

/// Fan-out tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Depth of each subscriber's outbound queue. A subscriber whose queue is
    /// full misses the frame; other subscribers are unaffected.
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
    /// Largest accepted `POST /api/input` body, in bytes.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
    /// Interval between WS pings sent to each subscriber. 0 disables pings.
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer: default_subscriber_buffer(),
            max_payload_bytes: default_max_payload_bytes(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_subscriber_buffer() -> usize {
    DEFAULT_SUBSCRIBER_BUFFER
}
fn default_max_payload_bytes() -> usize {
    DEFAULT_MAX_PAYLOAD_BYTES
}
fn default_heartbeat_interval_secs() -> u64 {
    DEFAULT_HEARTBEAT_INTERVAL_SECS
}

impl LocusConfig {
    /// Load config from a TOML file with LOCUS_* env var overrides.
    ///
    /// A missing file is not an error; every field has a default. Nested keys
    /// use a double underscore in env vars, e.g. `LOCUS_SERVER__PORT=9000`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
        tracing::debug!(path, "loading config");

        Self::extract(
            Figment::new()
                .merge(Toml::file(path))
                .merge(Env::prefixed("LOCUS_").split("__")),
        )
    }

    /// Extract and validate a config from an already-assembled figment.
    pub fn extract(figment: Figment) -> crate::error::Result<Self> {
        let config: LocusConfig = figment
            .extract()
            .map_err(|e| crate::error::LocusError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// `bind:port` string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.relay.subscriber_buffer == 0 {
            return Err(crate::error::LocusError::Config(
                "relay.subscriber_buffer must be at least 1".to_string(),
            ));
        }
        if self.relay.max_payload_bytes == 0 {
            return Err(crate::error::LocusError::Config(
                "relay.max_payload_bytes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
