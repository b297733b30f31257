//! Error types for API calls, with user-facing message normalization.
//!
//! Every failed request surfaces the same way a page banner would: the
//! backend's `detail` field when one exists, otherwise a generic
//! fallback. There is no retry policy and no transient/permanent
//! distinction.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status. `detail` is the
    /// backend's own message when the body carried one.
    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// The request never completed (connect, timeout, TLS).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx body that did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid API base URL '{0}'")]
    BaseUrl(String),
}

impl ApiError {
    /// Normalize any failure into a string fit for direct display,
    /// preferring the backend's `detail` text.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Api { detail, .. } => detail.clone(),
            ApiError::Transport(_) => "Network request failed. Please try again.".to_string(),
            ApiError::Decode(_) => "The server returned an unexpected response.".to_string(),
            ApiError::BaseUrl(url) => format!("'{url}' is not a valid API address."),
        }
    }

    /// HTTP status code, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
