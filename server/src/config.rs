//! Server configuration.
//!
//! Loaded once at startup from environment variables (a `.env` file is read
//! first by `main` when present). Every setting has a default so a bare
//! `property-server` starts against a local MongoDB.
//!
//! | variable | default |
//! |---|---|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `5000` |
//! | `STORE_BACKEND` | `mongodb` (`memory` for a throwaway in-process store) |
//! | `MONGODB_URI` | `mongodb://localhost:27017` |
//! | `MONGODB_DATABASE` | `property_management` |
//! | `MONGODB_COLLECTION` | `properties` |
//! | `CORS_ORIGINS` | empty, meaning any origin |

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT `{0}`")]
    InvalidPort(String),

    #[error("unknown STORE_BACKEND `{0}`, expected `mongodb` or `memory`")]
    UnknownBackend(String),
}

/// Which `PropertyStore` implementation to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDb,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::MongoDb),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoSettings {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "property_management".to_string(),
            collection: "properties".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub backend: StoreBackend,
    pub mongo: MongoSettings,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            backend: StoreBackend::MongoDb,
            mongo: MongoSettings::default(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup, falling back to defaults for
    /// missing or empty values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(backend) = get("STORE_BACKEND") {
            config.backend = backend.parse()?;
        }
        if let Some(uri) = get("MONGODB_URI") {
            config.mongo.uri = uri;
        }
        if let Some(database) = get("MONGODB_DATABASE") {
            config.mongo.database = database;
        }
        if let Some(collection) = get("MONGODB_COLLECTION") {
            config.mongo.collection = collection;
        }
        if let Some(origins) = get("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.socket_addr(), "0.0.0.0:5000");
        assert_eq!(config.backend, StoreBackend::MongoDb);
    }

    #[test]
    fn overrides_from_environment() {
        let config = load(&[
            ("PORT", "8080"),
            ("STORE_BACKEND", "Memory"),
            ("MONGODB_URI", "mongodb://db:27017"),
            ("MONGODB_DATABASE", "estates"),
            ("CORS_ORIGINS", "http://localhost:3000, https://app.example.com,"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.backend, StoreBackend::Memory);
        assert_eq!(config.mongo.uri, "mongodb://db:27017");
        assert_eq!(config.mongo.database, "estates");
        assert_eq!(config.mongo.collection, "properties");
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3000", "https://app.example.com"]
        );
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = load(&[("PORT", ""), ("HOST", "  ")]).unwrap();
        assert_eq!(config.socket_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn rejects_bad_port() {
        assert_eq!(
            load(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidPort("eighty".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(matches!(
            load(&[("STORE_BACKEND", "postgres")]),
            Err(ConfigError::UnknownBackend(_))
        ));
    }
}
