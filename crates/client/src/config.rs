use std::time::Duration;

use uuid::Uuid;

use crate::error::ClientError;

/// Refresh cadence of the planner's background poll.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_id: Uuid,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// `FOUNDERFLOW_API_URL`, `FOUNDERFLOW_USER_ID` and optional `FOUNDERFLOW_POLL_INTERVAL_MS`.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("FOUNDERFLOW_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3001".to_string());
        let user_id = std::env::var("FOUNDERFLOW_USER_ID")
            .ok()
            .and_then(|raw| Uuid::parse_str(&raw).ok())
            .ok_or_else(|| ClientError::Config("FOUNDERFLOW_USER_ID must be set to a UUID".to_string()))?;

        let mut config = Self::new(base_url, user_id);
        if let Some(ms) = std::env::var("FOUNDERFLOW_POLL_INTERVAL_MS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
        {
            config.poll_interval = Duration::from_millis(ms);
        }
        Ok(config)
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}
