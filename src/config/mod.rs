use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Errors raised while assembling runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET environment variable is not set")]
    MissingSecret,

    #[error("Invalid password hashing parameters: {0}")]
    InvalidHashParams(String),

    #[error("SECURITY_TOKEN_TTL_HOURS must be between 1 and {max}, got {0}", max = MAX_TOKEN_TTL_HOURS)]
    InvalidTokenTtl(u64),
}

/// Upper bound on the token lifetime: one year.
pub const MAX_TOKEN_TTL_HOURS: u64 = 24 * 366;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub gate: GateConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL. `None` selects the in-memory user store.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Symmetric signing secret. Never serialized.
    #[serde(skip_serializing, default)]
    pub jwt_secret: Option<String>,
    /// Single lifetime shared by token `exp` and the session cookie `Max-Age`.
    pub token_ttl_hours: u64,
    pub cookie_name: String,
    pub password_memory_kib: u32,
    pub password_iterations: u32,
    pub password_parallelism: u32,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    pub public_paths: Vec<String>,
    pub protected_page_prefixes: Vec<String>,
    pub protected_api_prefixes: Vec<String>,
    pub excluded_prefixes: Vec<String>,
    pub login_path: String,
    pub fail_closed: bool,
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

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("BELLBOT_API_HOST") {
            self.api.host = v;
        }
        if let Some(port) = env::var("BELLBOT_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("SECURITY_TOKEN_TTL_HOURS") {
            self.security.token_ttl_hours = v.parse().unwrap_or(self.security.token_ttl_hours);
        }
        if let Ok(v) = env::var("SECURITY_COOKIE_NAME") {
            self.security.cookie_name = v;
        }
        if let Ok(v) = env::var("SECURITY_PASSWORD_MEMORY_KIB") {
            self.security.password_memory_kib = v.parse().unwrap_or(self.security.password_memory_kib);
        }
        if let Ok(v) = env::var("SECURITY_PASSWORD_ITERATIONS") {
            self.security.password_iterations = v.parse().unwrap_or(self.security.password_iterations);
        }
        if let Ok(v) = env::var("SECURITY_PASSWORD_PARALLELISM") {
            self.security.password_parallelism = v.parse().unwrap_or(self.security.password_parallelism);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Gate overrides
        if let Ok(v) = env::var("GATE_FAIL_CLOSED") {
            self.gate.fail_closed = v.parse().unwrap_or(self.gate.fail_closed);
        }
        if let Ok(v) = env::var("GATE_PROTECTED_API_PREFIXES") {
            self.gate.protected_api_prefixes = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
            },
            security: SecurityConfig {
                jwt_secret: None,
                token_ttl_hours: 24,
                cookie_name: "bellbot-token".to_string(),
                password_memory_kib: 19456,
                password_iterations: 2,
                password_parallelism: 1,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            gate: GateConfig::default(),
        }
    }

    pub fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.security.cors_origins = vec!["https://staging.bellbot.app".to_string()];
        config
    }

    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.api.enable_request_logging = false;
        config.database.max_connections = 50;
        config.security.cors_origins = vec!["https://bellbot.app".to_string()];
        config
    }

    /// Session cookie lifetime in seconds, equal to the token lifetime.
    pub fn cookie_max_age_secs(&self) -> Result<u64, ConfigError> {
        self.security.token_ttl()?;
        self.security
            .token_ttl_hours
            .checked_mul(60 * 60)
            .ok_or(ConfigError::InvalidTokenTtl(self.security.token_ttl_hours))
    }
}

impl SecurityConfig {
    /// Validated token lifetime. Zero and values above `MAX_TOKEN_TTL_HOURS` are rejected.
    pub fn token_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        let invalid = || ConfigError::InvalidTokenTtl(self.token_ttl_hours);

        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.token_ttl_hours) {
            return Err(invalid());
        }

        let hours = i64::try_from(self.token_ttl_hours).map_err(|_| invalid())?;
        chrono::Duration::try_hours(hours).ok_or_else(invalid)
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            public_paths: owned(&[
                "/login",
                "/register",
                "/api/auth/login",
                "/api/auth/register",
                "/api/auth/me",
            ]),
            protected_page_prefixes: owned(&["/dashboard"]),
            protected_api_prefixes: owned(&["/api/properties", "/api/jobs", "/api/units"]),
            excluded_prefixes: owned(&["/_next/static", "/_next/image", "/favicon.ico", "/static"]),
            login_path: "/login".to_string(),
            fail_closed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.security.token_ttl_hours, 24);
        assert_eq!(config.security.cookie_name, "bellbot-token");
        assert!(config.security.jwt_secret.is_none());
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_cookie_lifetime_matches_token_lifetime() {
        let config = AppConfig::production();
        assert_eq!(config.cookie_max_age_secs().unwrap(), 24 * 3600);
        assert_eq!(config.security.token_ttl().unwrap(), chrono::Duration::hours(24));
        assert!(config.gate.fail_closed);
    }

    #[test]
    fn test_token_ttl_out_of_range_is_rejected() {
        for hours in [0, MAX_TOKEN_TTL_HOURS + 1, 1_000_000_000_000_000, u64::MAX] {
            let mut config = AppConfig::development();
            config.security.token_ttl_hours = hours;

            assert!(matches!(config.security.token_ttl(), Err(ConfigError::InvalidTokenTtl(h)) if h == hours));
            assert!(config.cookie_max_age_secs().is_err());
        }

        let mut config = AppConfig::development();
        config.security.token_ttl_hours = MAX_TOKEN_TTL_HOURS;
        assert!(config.security.token_ttl().is_ok());
    }

    #[test]
    fn test_password_parallelism_env_override() {
        env::set_var("SECURITY_PASSWORD_PARALLELISM", "4");
        let config = AppConfig::development().with_env_overrides();
        env::remove_var("SECURITY_PASSWORD_PARALLELISM");

        assert_eq!(config.security.password_parallelism, 4);
    }

    #[test]
    fn test_secret_is_not_serialized() {
        let mut config = AppConfig::development();
        config.security.jwt_secret = Some("hunter2".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
    }
}
