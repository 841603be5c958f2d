//! Application configuration
//!
//! Configuration lives in one JSON document holding named trees, one per
//! component. The relay reads its settings from the `WebSocketServer` tree and
//! writes defaults back on first run.

use crate::error::{RelayError, Result};
use crate::markdown::{Blacklist, COPY_CODE};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

/// Default location of the configuration document
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

/// Tree holding [`RelayConfig`]
pub const RELAY_TREE: &str = "WebSocketServer";

/// Named configuration trees backed by a JSON file
#[derive(Debug, Clone)]
pub struct AppConfig {
    path: PathBuf,
    trees: Map<String, Value>,
}

impl AppConfig {
    /// Load the document at `path`; a missing file yields an empty config
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let trees = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| RelayError::ConfigLoad {
                path: path.clone(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, starting empty", path.display());
                Map::new()
            }
            Err(e) => {
                return Err(RelayError::ConfigLoad {
                    path,
                    reason: e.to_string(),
                });
            }
        };

        Ok(Self { path, trees })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the tree stored under `name`, if any
    pub fn config_tree<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.trees
            .get(name)
            .map(|tree| {
                T::deserialize(tree).map_err(|e| RelayError::ConfigLoad {
                    path: self.path.clone(),
                    reason: format!("tree '{}': {}", name, e),
                })
            })
            .transpose()
    }

    /// Store `tree` under `name` and write the whole document back to disk
    pub fn set_config_tree<T: Serialize>(&mut self, name: &str, tree: &T) -> Result<()> {
        let value = serde_json::to_value(tree)?;
        self.trees.insert(name.to_string(), value);
        self.save()?;

        info!("Wrote config tree '{}' to {}", name, self.path.display());
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let save_err = |e: &dyn std::fmt::Display| RelayError::ConfigSave {
            path: self.path.clone(),
            reason: e.to_string(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| save_err(&e))?;
        }
        let contents = serde_json::to_string_pretty(&self.trees).map_err(|e| save_err(&e))?;
        fs::write(&self.path, contents).map_err(|e| save_err(&e))
    }
}

/// Settings for the WebSocket relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Address to listen on; IPv4 or IPv6 literal, or `localhost`
    pub listen_addr: String,

    pub listen_port: u16,

    /// Directory where raw inbound messages are kept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_dir: Option<PathBuf>,

    /// Phrases dropped from transcripts
    pub blacklist: Vec<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Ipv4Addr::LOCALHOST.to_string(),
            listen_port: 9090,
            archive_dir: None,
            blacklist: vec![COPY_CODE.to_string()],
        }
    }
}

impl RelayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    /// Builder method: set the listen port
    pub fn listen_port(mut self, port: u16) -> Self {
        self.listen_port = port;
        self
    }

    /// Builder method: keep raw messages under `dir`
    pub fn archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = Some(dir.into());
        self
    }

    /// Builder method: set blacklisted phrases
    pub fn blacklist(mut self, phrases: Vec<String>) -> Self {
        self.blacklist = phrases;
        self
    }

    /// Read the relay tree from `config`, using defaults when it is absent
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        Ok(config.config_tree::<Self>(RELAY_TREE)?.unwrap_or_default())
    }

    /// Load the relay tree from `config`, writing defaults back when it is absent
    pub fn load_or_bootstrap(config: &mut AppConfig) -> Result<Self> {
        match config.config_tree::<Self>(RELAY_TREE)? {
            Some(relay) => Ok(relay),
            None => {
                let relay = Self::default();
                config.set_config_tree(RELAY_TREE, &relay)?;
                Ok(relay)
            }
        }
    }

    /// Resolve the listen socket address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = if self.listen_addr.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.listen_addr
                .trim_start_matches('[')
                .trim_end_matches(']')
                .parse()
                .map_err(|e| RelayError::Bind(format!("invalid listen address '{}': {}", self.listen_addr, e)))?
        };
        Ok(SocketAddr::new(ip, self.listen_port))
    }

    /// Blacklist built from the configured phrases
    pub fn to_blacklist(&self) -> Blacklist {
        Blacklist::new(self.blacklist.iter().cloned())
    }
}
