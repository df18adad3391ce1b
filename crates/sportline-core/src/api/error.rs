use thiserror::Error;

use crate::auth::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport failure: timeout, unreachable host, request never
    /// completed. Retrying immediately is unlikely to help.
    #[error("connection error: {0}")]
    Connectivity(String),

    /// 401 after the refresh path was exhausted, or no refresh token held.
    #[error("authentication required - please log in again")]
    Unauthorized,

    /// Any other HTTP error status. The message is the response body's
    /// `detail` field when the server provides one.
    #[error("request failed: {message}")]
    Status { status: u16, message: String },

    /// The response arrived but its body did not parse as expected.
    #[error("invalid response: {0}")]
    Decode(String),

    /// Session persistence failed while the pipeline read or wrote tokens.
    #[error("session error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Build the error for a non-success HTTP status, pulling the server's
    /// `detail` message out of the body when there is one.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized;
        }

        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from));

        ApiError::Status {
            status: status.as_u16(),
            message: detail.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Connectivity("connection timed out".to_string())
        } else if err.is_connect() {
            ApiError::Connectivity("unable to connect to server".to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Connectivity(err.to_string())
        }
    }
}
