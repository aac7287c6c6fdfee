//! The server's `{success, data|error}` response envelope.

use serde::{Deserialize, Serialize};

/// Generic response envelope returned by every API endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    /// Whether the request succeeded.
    pub success: bool,

    /// Payload, present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error details, present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

impl<T> ApiEnvelope<T> {
    /// Collapse the envelope into a `Result`.
    ///
    /// A success envelope without a payload is treated as a server contract
    /// violation and surfaces as an error body.
    pub fn into_result(self) -> Result<T, ApiErrorBody> {
        if self.success {
            self.data.ok_or_else(|| ApiErrorBody {
                code: None,
                message: Some("success envelope carried no data".to_string()),
            })
        } else {
            Err(self.error.unwrap_or_default())
        }
    }
}

/// Structured error payload inside a failure envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code, if the server sent one.
    #[serde(default)]
    pub code: Option<String>,

    /// Human-readable message, if the server sent one.
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Best-effort human-readable description.
    pub fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(msg)) => format!("{code}: {msg}"),
            (Some(code), None) => code.clone(),
            (None, Some(msg)) => msg.clone(),
            (None, None) => "unspecified server error".to_string(),
        }
    }
}
