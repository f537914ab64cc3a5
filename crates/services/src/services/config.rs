//! Process configuration read from the environment.

use std::net::{IpAddr, SocketAddr};

use db::models::project_timeline::PhaseStatus;
use thiserror::Error;

use super::progress::ProgressMode;

const DEFAULT_DATABASE_URL: &str = "sqlite://founderflow.db";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    /// Status given to newly created phases.
    pub default_phase_status: PhaseStatus,
    pub progress_mode: ProgressMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            default_phase_status: PhaseStatus::Pending,
            progress_mode: ProgressMode::Weighted,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let host_raw = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = host_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "HOST",
            value: host_raw.clone(),
        })?;

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        let default_phase_status = match lookup("FOUNDERFLOW_DEFAULT_PHASE_STATUS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "FOUNDERFLOW_DEFAULT_PHASE_STATUS",
                value: raw.clone(),
            })?,
            None => PhaseStatus::Pending,
        };

        let progress_mode = match lookup("FOUNDERFLOW_PROGRESS_MODE") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "FOUNDERFLOW_PROGRESS_MODE",
                value: raw.clone(),
            })?,
            None => ProgressMode::Weighted,
        };

        Ok(Self {
            database_url,
            host,
            port,
            default_phase_status,
            progress_mode,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
