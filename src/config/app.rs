use anyhow::Result;
use std::env;
use std::time::Duration;

/// Which persistence backend the deployment runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceBackend {
    /// In-process, local-first store.
    Memory,
    Postgres,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub persistence_backend: PersistenceBackend,
    pub audit_enabled: bool,
    pub config_cache_ttl: Duration,
    pub config_fetch_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let persistence_backend = match env::var("PERSISTENCE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .as_str()
        {
            "postgres" => PersistenceBackend::Postgres,
            _ => PersistenceBackend::Memory,
        };

        let audit_enabled = env::var("AUDIT_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        let config_cache_ttl_secs = env::var("SAFETY_CONFIG_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .unwrap_or(3600);

        let config_fetch_timeout_secs = env::var("SAFETY_CONFIG_FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        Ok(AppConfig {
            host,
            port,
            environment,
            log_level,
            persistence_backend,
            audit_enabled,
            config_cache_ttl: Duration::from_secs(config_cache_ttl_secs),
            config_fetch_timeout: Duration::from_secs(config_fetch_timeout_secs),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
