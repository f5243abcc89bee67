//! Wire models for the subset of the Google Cloud REST APIs used by cloudpeek.
//!
//! Field names follow the proto3 JSON mapping (camelCase, 64-bit integers
//! encoded as strings).

use serde::{Deserialize, Serialize};

pub mod int64;
pub mod logging;
pub mod monitoring;
pub mod trace;

/// Envelope Google APIs wrap non-2xx responses in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorStatus {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    /// Canonical status name, e.g. `RESOURCE_EXHAUSTED`
    #[serde(default)]
    pub status: String,
}

impl ErrorBody {
    /// Parse an error response body, returning `None` when it is not a Google error envelope.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}
