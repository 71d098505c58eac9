//! Error types for the generative service clients.

/// A specialized `Result` type for generative service calls.
pub type Result<T> = std::result::Result<T, GenAiError>;

/// Errors raised while talking to a generative backend.
#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    /// No API credential was found in the environment.
    #[error("Generative API credential missing\n\nSuggestion: Export GEMINI_API_KEY (or API_KEY) before starting the arcade")]
    MissingCredential,

    /// The request never produced an HTTP response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status code.
    #[error("Generative API returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the backend.
        body: String,
    },

    /// The response body was not the JSON we expected.
    #[error("Failed to decode response JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An inline media payload was not valid base64.
    #[error("Inline media payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The response parsed but lacked a field the caller needs.
    #[error("Unexpected response from generative API: {0}")]
    UnexpectedResponse(String),
}

impl GenAiError {
    /// Creates a new `Status` error.
    #[must_use]
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Creates a new `UnexpectedResponse` error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse(message.into())
    }

    /// Returns `true` if the failure happened on the wire rather than in
    /// the payload: connection problems, timeouts and non-success statuses.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }

    /// Returns `true` if retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
