//! Wire envelopes shared by every route.
//!
//! Successful responses wrap the affected entity under a named key (`{ "phase": .. }`,
//! `{ "tasks": [..] }`), failures are always `{ "error": "..." }`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body returned by delete endpoints and health checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
