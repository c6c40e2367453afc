use loto_core::{EngineConfig, LotoError, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `LOTO_HOST` and `PORT` on top of the engine variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            engine: EngineConfig::from_env(),
            ..Self::default()
        };

        if let Ok(host) = std::env::var("LOTO_HOST") {
            config.host = host
                .parse()
                .map_err(|_| LotoError::config(format!("Invalid LOTO_HOST: {}", host)))?;
        }

        if let Ok(port) = std::env::var("PORT") {
            config.port = port
                .parse()
                .map_err(|_| LotoError::config(format!("Invalid PORT: {}", port)))?;
        }

        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
