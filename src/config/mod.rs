use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub invites: InviteConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Shared secret for the versioned read API. `None` rejects every request.
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: Option<String>,
    pub jwt_audience: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteConfig {
    pub expiry_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    /// JSON document loaded into the memory backend at startup
    pub seed_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub permissive_cors: bool,
    pub cors_origins: Vec<String>,
}

/// Longest invite lifetime accepted at startup
pub const MAX_INVITE_EXPIRY_DAYS: i64 = 365;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("UNCONF_HOST") {
            self.server.host = v;
        }
        if let Some(v) = env::var("UNCONF_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value: v.clone() })?;
        }

        // Credentials: empty values count as unconfigured
        self.api.secret_key = non_empty_var("API_SECRET_KEY");
        self.auth.jwt_secret = non_empty_var("AUTH_JWT_SECRET");
        if let Some(v) = non_empty_var("AUTH_JWT_AUDIENCE") {
            self.auth.jwt_audience = Some(v);
        }

        if let Some(v) = parse_var("INVITE_EXPIRY_DAYS")? {
            self.invites.expiry_days = v;
        }

        // Database overrides
        self.database.url = non_empty_var("DATABASE_URL");
        if let Ok(v) = env::var("STORE_BACKEND") {
            self.database.backend = match v.as_str() {
                "postgres" => StoreBackend::Postgres,
                "memory" => StoreBackend::Memory,
                _ => return Err(ConfigError::Invalid { name: "STORE_BACKEND", value: v }),
            };
        }
        if let Some(v) = parse_var("DATABASE_MAX_CONNECTIONS")? {
            self.database.max_connections = v;
        }
        if let Some(v) = parse_var("DATABASE_CONNECTION_TIMEOUT")? {
            self.database.connection_timeout = v;
        }

        if let Some(v) = non_empty_var("MEMORY_SEED_PATH") {
            self.database.seed_path = Some(v);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            self.security.permissive_cors = false;
        }

        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.backend == StoreBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if !(1..=MAX_INVITE_EXPIRY_DAYS).contains(&self.invites.expiry_days) {
            return Err(ConfigError::Invalid {
                name: "INVITE_EXPIRY_DAYS",
                value: self.invites.expiry_days.to_string(),
            });
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { host: "127.0.0.1".to_string(), port: 3000 },
            api: ApiConfig { secret_key: None },
            auth: AuthConfig { jwt_secret: None, jwt_audience: None },
            invites: InviteConfig { expiry_days: 7 },
            database: DatabaseConfig {
                backend: StoreBackend::Memory,
                url: None,
                max_connections: 5,
                connection_timeout: 30,
                seed_path: None,
            },
            security: SecurityConfig {
                permissive_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { host: "0.0.0.0".to_string(), port: 3000 },
            api: ApiConfig { secret_key: None },
            auth: AuthConfig { jwt_secret: None, jwt_audience: Some("authenticated".to_string()) },
            invites: InviteConfig { expiry_days: 7 },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 10,
                seed_path: None,
            },
            security: SecurityConfig {
                permissive_cors: false,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { host: "0.0.0.0".to_string(), port: 3000 },
            api: ApiConfig { secret_key: None },
            auth: AuthConfig { jwt_secret: None, jwt_audience: Some("authenticated".to_string()) },
            invites: InviteConfig { expiry_days: 7 },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 5,
                seed_path: None,
            },
            security: SecurityConfig {
                permissive_cors: false,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Unset leaves the preset alone; a value that does not parse is an error
fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(v) => parse_value(name, &v).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_value<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
