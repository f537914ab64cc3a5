use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    /// Non-2xx response; `message` is the server's `error` field.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("json error: {0}")]
    Serde(String),
    #[error("invalid client configuration: {0}")]
    Config(String),
    #[error("phase deletion was not confirmed")]
    NotConfirmed,
    #[error("phase {0} is not loaded")]
    UnknownPhase(Uuid),
}
