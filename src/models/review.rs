//! Payloads of the inbound `/review` endpoint.

use serde::{Deserialize, Serialize};

/// Body a caller POSTs to `/review`.
///
/// `diff` is required and must be a string; it is treated as opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewRequest {
    pub diff: String,
}

impl ReviewRequest {
    /// Decode a request body. Trailing data after the JSON object is rejected.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

/// Body returned to the caller on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewResponse {
    pub review: String,
}

impl ReviewResponse {
    /// Serialize to JSON.
    ///
    /// `serde_json` never HTML-escapes, so Markdown such as `a && b` or
    /// `Vec<T>` reaches the caller byte for byte.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
