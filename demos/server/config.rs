//! Configuration structs for the server demo.
//!
//! | Field                    | Flags                   | Env var                  |
//! |--------------------------|-------------------------|--------------------------|
//! | `name`                   | `--p:name`              | `NAME`                   |
//! | `verbose`                | `--verbose`, `-v`       | `VERBOSE`                |
//! | `listen.host`            | `--host`, `-H`          | `SERVER_HOST`            |
//! | `listen.port`            | `--port`, `-p`          | `SERVER_PORT`            |
//! | `listen.maxConnections`  | `--p:maxConnections`    | `SERVER_MAX_CONNECTIONS` |
//! | `storage.dataDir`        | `--data-dir`            | `STORAGE_DATA_DIR`       |
//! | `storage.cacheMb`        | `--p:cacheMb`           | `STORAGE_CACHE_MB`       |
//! | `tls.cert`               | `--p:cert`              | `TLS_CERT`               |
//! | `tls.key`                | `--p:key`               | `TLS_KEY`                |

#![allow(non_snake_case)]

use std::path::PathBuf;

use appconfig::Settings;
use serde::{Deserialize, Serialize};

/// Root configuration for the demo server.
#[derive(Settings, Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// Instance name, shown in the startup banner.
    pub name: String,

    #[config(arg = "verbose", short = "v")]
    pub verbose: bool,

    /// Where to accept connections. Its variables are prefixed `SERVER_`.
    #[config(nested, env = "SERVER")]
    pub listen: ListenConfig,

    #[config(nested)]
    pub storage: StorageConfig,

    /// Only reachable from flags and variables once a config file enables it.
    #[config(nested)]
    pub tls: Option<TlsConfig>,

    /// Filled in at runtime; never read from any source.
    #[serde(skip)]
    #[config(skip)]
    pub started_by: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "demo".into(),
            verbose: false,
            listen: ListenConfig::default(),
            storage: StorageConfig::default(),
            tls: None,
            started_by: String::new(),
        }
    }
}

#[derive(Settings, Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ListenConfig {
    #[config(arg = "host", short = "H")]
    pub host: String,

    #[config(arg = "port", short = "p")]
    pub port: u16,

    pub maxConnections: u32,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            maxConnections: 100,
        }
    }
}

#[derive(Settings, Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StorageConfig {
    #[config(arg = "data-dir")]
    pub dataDir: PathBuf,

    pub cacheMb: f64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dataDir: PathBuf::from("./data"),
            cacheMb: 64.0,
        }
    }
}

#[derive(Settings, Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct TlsConfig {
    pub cert: PathBuf,
    pub key: Option<PathBuf>,
}
