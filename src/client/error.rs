use thiserror::Error;

/// Errors from talking to the remote resource endpoint.
///
/// SECURITY: Error messages must NEVER contain the bearer token.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Authentication failed (invalid or expired token)
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network-level error (connection failed, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint reported that no resource exists for the identifier.
    #[error("resource not found: '{id}'")]
    NotFound { id: String },

    /// The endpoint answered 2xx but the body was not usable.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
