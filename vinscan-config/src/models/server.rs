use std::{net::SocketAddr, path::PathBuf};

use crate::{credential::ApiKey, error::ConfigError};

/// Settings for `vinscan-server`, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Key every `/api/*` request must present.
    pub api_key: ApiKey,
    /// JSON file backing the store; in-memory when unset.
    pub store_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            api_key: ApiKey::default(),
            store_path: None,
        }
    }
}

impl ServerConfig {
    /// Reads `SERVER_HOST`, `SERVER_PORT`, `API_KEY` and `VINSCAN_STORE_PATH`.
    /// Call after `.env` has been loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|var| std::env::var(var).ok())
    }

    pub fn from_env_with(
        get: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |var: &str| get(var).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("SERVER_HOST") {
            config.host = host.trim().to_string();
        }
        if let Some(raw) = get("SERVER_PORT") {
            config.port = raw.trim().parse().map_err(|err: std::num::ParseIntError| {
                ConfigError::Env {
                    var: "SERVER_PORT",
                    value: raw.clone(),
                    reason: err.to_string(),
                }
            })?;
        }
        config.api_key = get("API_KEY")
            .map(|key| ApiKey::new(key.trim()))
            .ok_or(ConfigError::MissingApiKey)?;
        config.store_path = get("VINSCAN_STORE_PATH").map(PathBuf::from);

        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port).parse().map_err(|_| {
            ConfigError::Invalid(format!(
                "SERVER_HOST/SERVER_PORT do not form a socket address: {}:{}",
                self.host, self.port
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_environment_with_defaults() {
        let config = ServerConfig::from_env_with(|var| match var {
            "API_KEY" => Some("k".into()),
            "SERVER_PORT" => Some("8080".into()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_key.expose(), "k");
        assert!(config.store_path.is_none());
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn api_key_is_required() {
        assert!(matches!(
            ServerConfig::from_env_with(|_| None),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn bad_port_is_reported() {
        let err = ServerConfig::from_env_with(|var| match var {
            "API_KEY" => Some("k".into()),
            "SERVER_PORT" => Some("http".into()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "SERVER_PORT", .. }));
    }
}
