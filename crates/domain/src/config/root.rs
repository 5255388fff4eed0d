use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::proxy::ForwardingConfig;
use super::server::ServerConfig;
use crate::endpoint::Backend;
use crate::route_table::RouteTable;

/// Main configuration structure for split-dns
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (shared UDP/TCP address)
    #[serde(default)]
    pub server: ServerConfig,

    /// Routing, default backend and transfer allow-list
    #[serde(default)]
    pub forwarding: ForwardingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Flag values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub listen: Option<String>,
    pub default_server: Option<String>,
    pub routes: Vec<String>,
    pub allow_transfer: Option<Vec<String>>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. split-dns.toml in current directory
    /// 3. /etc/split-dns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("split-dns.toml").exists() {
            Self::from_file("split-dns.toml")?
        } else if std::path::Path::new("/etc/split-dns/config.toml").exists() {
            Self::from_file("/etc/split-dns/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides. Scalar flags replace file values;
    /// `--route` flags are appended after the file's routes.
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(listen) = overrides.listen {
            self.server.listen = listen;
        }
        if let Some(server) = overrides.default_server {
            self.forwarding.default_server = Some(server);
        }
        self.forwarding.routes.extend(overrides.routes);
        if let Some(allow) = overrides.allow_transfer {
            self.forwarding.allow_transfer = allow;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration. Runs before any socket is bound; a malformed
    /// route or endpoint is fatal here, never a per-query condition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .listen
            .parse::<std::net::SocketAddr>()
            .map_err(|e| {
                ConfigError::Validation(format!(
                    "invalid listen address '{}': {}",
                    self.server.listen, e
                ))
            })?;

        if let Some(backend) = self.default_backend()? {
            if backend.is_https() {
                return Err(ConfigError::Validation(format!(
                    "default server '{}' must be a classic IP:PORT endpoint",
                    backend
                )));
            }
        }

        // Surfaces malformed route entries and duplicate suffixes.
        RouteTable::build(&self.forwarding.routes)?;

        if self.forwarding.routes.is_empty() && self.forwarding.default_server.is_none() {
            return Err(ConfigError::Validation(
                "no routes and no default server configured".to_string(),
            ));
        }

        Ok(())
    }

    pub fn default_backend(&self) -> Result<Option<Backend>, ConfigError> {
        self.forwarding
            .default_server
            .as_deref()
            .map(|s| {
                s.parse::<Backend>().map_err(|e| {
                    ConfigError::Validation(format!("default server: {}", e))
                })
            })
            .transpose()
    }
}
