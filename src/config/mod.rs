use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database name swapped into the DATABASE_URL path. None keeps the URL
    /// as given.
    pub database_name: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins. Empty means permissive (development default).
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 5005 },
            store: StoreConfig {
                database_name: None,
                max_connections: 5,
            },
            security: SecurityConfig { cors_origins: vec![] },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            store: StoreConfig {
                database_name: None,
                max_connections: 20,
            },
            ..Self::development()
        }
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("COHORT_TOOLS_DB") {
            self.store.database_name = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.store.max_connections = v.parse().unwrap_or(self.store.max_connections);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        self
    }
}

static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

/// Process-wide configuration, loaded once on first access.
pub fn config() -> &'static AppConfig {
    &CONFIG
}
