use chrono::Duration;
use jsonwebtoken::Algorithm;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Unsupported token algorithm '{0}' (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),

    #[error("Invalid value '{value}' for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub page_size: i64,
    pub log_filter: String,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub auth: AuthConfig,
}

/// Token signing settings. Immutable once the process has started.
#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub access_token_ttl: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .finish()
    }
}

impl AuthConfig {
    pub const DEFAULT_TTL_MINUTES: i64 = 15;
    /// One year.
    pub const MAX_TTL_MINUTES: i64 = 525_600;

    pub fn new(secret: impl Into<String>, algorithm: Algorithm, access_token_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            algorithm,
            access_token_ttl,
        }
    }
}

/// Parse an algorithm name, accepting only the shared-secret HMAC family.
pub fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    let algorithm = Algorithm::from_str(name.trim())
        .map_err(|_| ConfigError::UnsupportedAlgorithm(name.to_string()))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        _ => Err(ConfigError::UnsupportedAlgorithm(name.to_string())),
    }
}

/// Parse a numeric setting, rejecting anything malformed or below `min`.
fn parse_at_least<T>(name: &'static str, value: &str, min: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd,
{
    let parsed: T = value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: "not a number in range",
    })?;
    if parsed < min {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "below the minimum",
        });
    }
    Ok(parsed)
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = Self::preset(environment).with_env_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn preset(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Database overrides
        if let Some(v) = var("DATABASE_URL").or_else(|| var("DB_URL")) {
            self.database.url = v;
        }
        if let Some(v) = var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_at_least("DATABASE_MAX_CONNECTIONS", &v, 1)?;
        }
        if let Some(v) = var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_at_least("DATABASE_CONNECTION_TIMEOUT", &v, 1)?;
        }

        // API overrides
        if let Some(v) = var("API_PORT").or_else(|| var("PORT")) {
            self.api.port = parse_at_least("PORT", &v, 0)?;
        }
        if let Some(v) = var("API_PAGE_SIZE") {
            self.api.page_size = parse_at_least("API_PAGE_SIZE", &v, 1)?;
        }

        // Security overrides
        if let Some(v) = var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Some(v) = var("SECRET_KEY") {
            self.security.auth.secret = v;
        }
        if let Some(v) = var("ALGORITHM") {
            self.security.auth.algorithm = parse_algorithm(&v)?;
        }
        if let Some(v) = var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            let minutes: i64 = parse_at_least("ACCESS_TOKEN_EXPIRE_MINUTES", &v, 1)?;
            if minutes > AuthConfig::MAX_TTL_MINUTES {
                return Err(ConfigError::Invalid {
                    name: "ACCESS_TOKEN_EXPIRE_MINUTES",
                    value: v,
                    reason: "longer than one year",
                });
            }
            self.security.auth.access_token_ttl = Duration::minutes(minutes);
        }

        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if self.security.auth.secret.is_empty() {
            return Err(ConfigError::Missing("SECRET_KEY"));
        }
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 8000,
                page_size: 10,
                log_filter: "info,tower_http=debug".to_string(),
            },
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
                auth: AuthConfig::new(
                    String::new(),
                    Algorithm::HS256,
                    Duration::minutes(AuthConfig::DEFAULT_TTL_MINUTES),
                ),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 8000,
                page_size: 10,
                log_filter: "info".to_string(),
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
                auth: AuthConfig::new(
                    String::new(),
                    Algorithm::HS256,
                    Duration::minutes(AuthConfig::DEFAULT_TTL_MINUTES),
                ),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 8000,
                page_size: 10,
                log_filter: "info".to_string(),
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
                auth: AuthConfig::new(
                    String::new(),
                    Algorithm::HS256,
                    Duration::minutes(AuthConfig::DEFAULT_TTL_MINUTES),
                ),
            },
        }
    }
}
