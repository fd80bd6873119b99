//! Typed errors for the HTTP binding layer.

use serde_json::Value;

/// Errors produced by [`super::ApiClient`] calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a status outside 2xx.
    #[error("{}", http_message(.status, .status_text, .detail))]
    Http { status: u16, status_text: String, detail: Option<String> },

    /// The request never produced a response (connect, TLS, timeout).
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// A body was expected but the server sent `204 No Content`.
    #[error("expected a response body but the server sent none")]
    EmptyBody,

    /// A multipart part could not be built.
    #[error("invalid multipart part: {0}")]
    Multipart(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Whether retrying the same request later could plausibly succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Http { status: 408 | 429 | 500..=599, .. })
    }

    /// HTTP status for `Http` errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error)
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref, clippy::ref_option)]
fn http_message(status: &u16, status_text: &str, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => detail.clone(),
        None => format!("{status} {status_text}").trim_end().to_owned(),
    }
}

/// Pull the `detail` field out of an error body.
///
/// String details are kept verbatim; structured details (validation error
/// lists) are rendered as compact JSON. Anything unparsable yields `None`.
#[must_use]
pub fn parse_error_detail(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}
