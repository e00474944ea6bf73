//! Configuration schema structs

use serde::{Deserialize, Serialize};

use salon_protocol::DEFAULT_PORT;

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub limits: LimitsConfig,
}

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the TCP listener to (default: all interfaces)
    pub bind_address: String,
    /// TCP port to listen on (default: 6667)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".into(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// The `host:port` string handed to the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Resource limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Per-client outbound queue capacity; messages beyond it are dropped
    /// for that client (default: 256)
    pub outbound_queue: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            outbound_queue: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 6667);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.limits.outbound_queue, 256);
    }

    #[test]
    fn test_listen_addr() {
        let config = ServerConfig {
            bind_address: "127.0.0.1".into(),
            port: 7000,
        };
        assert_eq!(config.listen_addr(), "127.0.0.1:7000");
    }
}
