//! Response helpers shared by the endpoint modules.

use serde::Deserialize;

use ub_core::error::{UbError, UbResult};
use ub_models::ActionResponse;

/// Error body shapes the backend and identity provider return.
///
/// The backend answers `{"message": ".."}` or `{"error": ".."}`; the identity
/// provider nests `{"error": {"code": 400, "message": "EMAIL_NOT_FOUND"}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Text(String),
    Nested {
        #[serde(default)]
        code: Option<u16>,
        #[serde(default)]
        message: Option<String>,
    },
}

impl ErrorBody {
    /// Best human-readable text for an error body; the raw body otherwise.
    pub fn describe(body: &str) -> String {
        let parsed = serde_json::from_str::<ErrorBody>(body).ok();
        let text = parsed.and_then(|b| match b.error {
            Some(ErrorDetail::Text(t)) => Some(t),
            Some(ErrorDetail::Nested { message, .. }) => message.or(b.message),
            None => b.message,
        });
        text.unwrap_or_else(|| body.trim().to_string())
    }
}

/// Turn a `{success, message}` reply into a result. A `success: false` reply
/// becomes `SendFailed` carrying the server's message.
pub fn into_result(resp: ActionResponse) -> UbResult<String> {
    if resp.success {
        Ok(resp.message)
    } else if resp.message.is_empty() {
        Err(UbError::SendFailed("server reported failure".into()))
    } else {
        Err(UbError::SendFailed(resp.message))
    }
}
