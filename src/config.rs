use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Development-only signing secret. The production profile refuses to start
/// without an explicit JWT_SECRET so this value can never sign real tokens.
const DEV_JWT_SECRET: &str = "clinic-api-dev-secret-not-for-production!!";

const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("JWT_SECRET must be set to at least {MIN_JWT_SECRET_LEN} bytes in production")]
    WeakJwtSecret,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_ttl_hours: i64,
    pub pbkdf2_iterations: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub patient_list_ttl_secs: u64,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Fails (rather than falling back to a default key) when production is
    /// selected without an explicit, sufficiently long JWT secret.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => {
                if environment == Environment::Production && secret.len() < MIN_JWT_SECRET_LEN {
                    return Err(ConfigError::WeakJwtSecret);
                }
                secret
            }
            Err(_) if environment == Environment::Production => {
                return Err(ConfigError::WeakJwtSecret);
            }
            Err(_) => DEV_JWT_SECRET.to_string(),
        };

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        Ok(Self {
            environment,
            server: ServerConfig { port },
            database: DatabaseConfig {
                url: database_url,
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 10),
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "clinic-api".to_string()),
                jwt_audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "clinic-api".to_string()),
                token_ttl_hours: env_parse("JWT_EXPIRY_HOURS", 8),
                pbkdf2_iterations: env_parse("PBKDF2_ITERATIONS", 100_000),
            },
            cache: CacheConfig {
                patient_list_ttl_secs: env_parse("PATIENT_LIST_CACHE_TTL_SECS", 300),
            },
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        server: ServerConfig { port: 0 },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        security: SecurityConfig {
            jwt_secret: "unit-test-secret".to_string(),
            jwt_issuer: "clinic-api".to_string(),
            jwt_audience: "clinic-api".to_string(),
            token_ttl_hours: 8,
            // Keep key derivation cheap in tests; production default is 100k
            pbkdf2_iterations: 1_000,
        },
        cache: CacheConfig {
            patient_list_ttl_secs: 300,
        },
    }
}
