//! API configuration, loaded from environment variables with development
//! defaults.

use std::net::SocketAddr;

use crate::error::{ApiError, ApiResult};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host for the HTTP listener.
    pub bind_host: String,

    /// Bind port for the HTTP listener.
    pub port: u16,

    /// Allowed CORS origins. Empty means allow any origin (dev mode, which
    /// is what the mobile client expects of the mock server).
    pub cors_origins: Vec<String>,

    /// Whether to seed the demo data set at startup.
    pub seed_demo: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3001,
            cors_origins: Vec::new(),
            seed_demo: true,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `CORRAL_API_BIND`: bind host (default: 0.0.0.0)
    /// - `PORT` / `CORRAL_API_PORT`: bind port (default: 3001)
    /// - `CORRAL_CORS_ORIGINS`: comma-separated allowed origins (empty = allow all)
    /// - `CORRAL_SEED_DEMO`: "false" to start with an empty store (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_host =
            std::env::var("CORRAL_API_BIND").unwrap_or(defaults.bind_host);

        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("CORRAL_API_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let cors_origins = std::env::var("CORRAL_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let seed_demo = std::env::var("CORRAL_SEED_DEMO")
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(defaults.seed_demo);

        Self {
            bind_host,
            port,
            cors_origins,
            seed_demo,
        }
    }

    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bind_addr_parses() {
        let config = ApiConfig::default();
        let addr = config.bind_addr().unwrap();
        assert_eq!(addr.port(), 3001);
    }
}
