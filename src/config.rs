use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Env var naming an optional YAML config file.
pub const CONFIG_ENV: &str = "LANTERN_CONFIG";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on
    pub host: String,
    /// Port, overridden by the command line argument
    pub port: String,
    /// How long a socket may stay silent before its request is finalized
    pub read_timeout_ms: u64,
    /// Size of a single socket read
    pub read_chunk_size: usize,
    /// Readiness events drained per poll
    pub max_events: usize,
    /// Starting capacity of receive and response buffers
    pub initial_buffer_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: "8080".to_string(),
            read_timeout_ms: 5_000,
            read_chunk_size: 4 * 1024,
            max_events: 1024,
            initial_buffer_capacity: 256,
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Document root scanned into the file catalogue
    pub root: String,
    /// Bucket count of the catalogue hash table
    pub buckets: usize,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            root: "./http_docs".to_string(),
            buckets: 128,
        }
    }
}

impl Config {
    /// Defaults, then the YAML file named by `LANTERN_CONFIG`, then the
    /// `LISTEN` and `LANTERN_ROOT` overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path))?;
                Self::from_yaml(&raw).with_context(|| format!("parsing config file {}", path))?
            }
            Err(_) => Self::default(),
        };

        if let Ok(host) = std::env::var("LISTEN") {
            cfg.server.host = host;
        }
        if let Ok(root) = std::env::var("LANTERN_ROOT") {
            cfg.static_files.root = root;
        }

        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }
}
