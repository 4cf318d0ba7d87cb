use crate::infrastructure::security::{DEFAULT_M_COST, DEFAULT_P_COST, DEFAULT_T_COST, PasswordHashing};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Where accounts are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory,
    Sqlite { url: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub log_level: String,
    pub argon2_m_cost: u32,
    pub argon2_t_cost: u32,
    pub argon2_p_cost: u32,
}

impl AppConfig {
    /// Reads configuration from the process environment, after loading `.env`
    /// if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            None => StoreConfig::Memory,
            Some(url) if url.starts_with("sqlite:") => StoreConfig::Sqlite { url },
            Some(url) => {
                return Err(ConfigError::Invalid {
                    key: "DATABASE_URL",
                    value: url,
                    reason: "only sqlite: URLs are supported".to_string(),
                });
            }
        };

        let config = Self {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            store,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            argon2_m_cost: parse_or(&lookup, "ARGON2_M_COST", DEFAULT_M_COST)?,
            argon2_t_cost: parse_or(&lookup, "ARGON2_T_COST", DEFAULT_T_COST)?,
            argon2_p_cost: parse_or(&lookup, "ARGON2_P_COST", DEFAULT_P_COST)?,
        };
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    pub fn password_hashing(&self) -> Result<PasswordHashing, ConfigError> {
        PasswordHashing::new(self.argon2_m_cost, self.argon2_t_cost, self.argon2_p_cost).map_err(|e| {
            ConfigError::Invalid {
                key: "ARGON2_M_COST/ARGON2_T_COST/ARGON2_P_COST",
                value: format!(
                    "{}/{}/{}",
                    self.argon2_m_cost, self.argon2_t_cost, self.argon2_p_cost
                ),
                reason: e.to_string(),
            }
        })
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            }),
        },
    }
}
