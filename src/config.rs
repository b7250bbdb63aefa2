//! Process configuration, read from the environment (and `.env` if present).

use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use dotenvy::dotenv;
use tracing::info;

use crate::error::Error;

/// Service configuration.
///
/// | Variable | Default | |
/// |---|---|---|
/// | `HOST` | `127.0.0.1` | bind address |
/// | `PORT` | `3000` | bind port |
/// | `API_KEY` | required | value expected in `x-api-key` |
/// | `SEED_CATALOG` | `true` | start with the three sample products |
#[derive(Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub api_key: String,
    pub seed_catalog: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        dotenv().ok();
        let config = Self::from_lookup(|name| env::var(name).ok())?;
        info!(addr = %config.socket_addr(), seed_catalog = config.seed_catalog, "configuration loaded");
        Ok(config)
    }

    /// Builds a config from any variable source; `from_env` passes the process
    /// environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let host = get("HOST")
            .unwrap_or_else(|| "127.0.0.1".to_owned())
            .parse::<IpAddr>()
            .map_err(|e| Error::Config(format!("invalid HOST: {e}")))?;

        let port = get("PORT")
            .unwrap_or_else(|| "3000".to_owned())
            .parse::<u16>()
            .map_err(|e| Error::Config(format!("invalid PORT: {e}")))?;

        let api_key = get("API_KEY")
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("missing environment variable 'API_KEY'".to_owned()))?;

        let seed_catalog = get("SEED_CATALOG")
            .unwrap_or_else(|| "true".to_owned())
            .parse::<bool>()
            .map_err(|e| Error::Config(format!("invalid SEED_CATALOG: {e}")))?;

        Ok(Self { host, port, api_key, seed_catalog })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// Keeps the secret out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &"[REDACTED]")
            .field("seed_catalog", &self.seed_catalog)
            .finish()
    }
}
