use std::env;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub titles: TitleConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: SigningKey,
    pub argon2_m_cost: u32,
    pub argon2_t_cost: u32,
    pub argon2_p_cost: u32,
}

#[derive(Debug, Clone)]
pub struct TitleConfig {
    pub fetch_enabled: bool,
    pub fetch_timeout_secs: u64,
    pub max_body_bytes: usize,
}

/// HMAC key for session tokens. Debug output never shows the key material.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(String);

impl SigningKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey([redacted])")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PINBOX_JWT_SECRET must be set to a non-empty value")]
    MissingSigningKey,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let secret = lookup("PINBOX_JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSigningKey)?;

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(SigningKey::new(secret)),
            Environment::Staging => Self::staging(SigningKey::new(secret)),
            Environment::Development => Self::development(SigningKey::new(secret)),
        };

        Ok(config.with_overrides(lookup))
    }

    fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // API overrides
        if let Some(v) = lookup("PINBOX_HOST") {
            self.api.host = v;
        }
        if let Some(v) = lookup("PINBOX_PORT").or_else(|| lookup("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Some(v) = lookup("PINBOX_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Some(v) = lookup("PINBOX_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Some(v) = lookup("PINBOX_ARGON2_M_COST") {
            self.security.argon2_m_cost = v.parse().unwrap_or(self.security.argon2_m_cost);
        }
        if let Some(v) = lookup("PINBOX_ARGON2_T_COST") {
            self.security.argon2_t_cost = v.parse().unwrap_or(self.security.argon2_t_cost);
        }
        if let Some(v) = lookup("PINBOX_ARGON2_P_COST") {
            self.security.argon2_p_cost = v.parse().unwrap_or(self.security.argon2_p_cost);
        }

        // Title fetch overrides
        if let Some(v) = lookup("PINBOX_TITLE_FETCH_ENABLED") {
            self.titles.fetch_enabled = v.parse().unwrap_or(self.titles.fetch_enabled);
        }
        if let Some(v) = lookup("PINBOX_TITLE_FETCH_TIMEOUT_SECS") {
            self.titles.fetch_timeout_secs = v.parse().unwrap_or(self.titles.fetch_timeout_secs);
        }
        if let Some(v) = lookup("PINBOX_TITLE_MAX_BODY_BYTES") {
            self.titles.max_body_bytes = v.parse().unwrap_or(self.titles.max_body_bytes);
        }

        self
    }

    pub fn development(jwt_secret: SigningKey) -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                jwt_secret,
                argon2_m_cost: 19 * 1024,
                argon2_t_cost: 2,
                argon2_p_cost: 1,
            },
            titles: TitleConfig {
                fetch_enabled: true,
                fetch_timeout_secs: 5,
                max_body_bytes: 512 * 1024,
            },
        }
    }

    fn staging(jwt_secret: SigningKey) -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024,
            },
            security: SecurityConfig {
                jwt_secret,
                argon2_m_cost: 19 * 1024,
                argon2_t_cost: 2,
                argon2_p_cost: 1,
            },
            titles: TitleConfig {
                fetch_enabled: true,
                fetch_timeout_secs: 5,
                max_body_bytes: 512 * 1024,
            },
        }
    }

    fn production(jwt_secret: SigningKey) -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                enable_request_logging: false,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig {
                jwt_secret,
                argon2_m_cost: 64 * 1024,
                argon2_t_cost: 3,
                argon2_p_cost: 1,
            },
            titles: TitleConfig {
                fetch_enabled: true,
                fetch_timeout_secs: 5,
                max_body_bytes: 256 * 1024,
            },
        }
    }
}
