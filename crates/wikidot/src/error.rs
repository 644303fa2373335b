//! Error taxonomy for the client.

/// Errors that can occur while talking to a wiki.
#[derive(thiserror::Error, Debug)]
pub enum WikidotError {
    /// The login was rejected, or the server did not hand back a session cookie.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx or non-JSON answer from the module connector.
    #[error("Request failed with status {status}: {body}")]
    Request { status: u16, body: String },

    /// A name or URL was rejected locally; nothing was sent.
    #[error("Invalid name {name:?}: {reason}")]
    Validation { name: String, reason: String },

    /// A well-formed response without the field or fragment the caller needs.
    #[error("Unexpected response: {0}")]
    Response(String),
}

impl WikidotError {
    pub(crate) fn validation(name: impl Into<String>, reason: impl Into<String>) -> Self {
        WikidotError::Validation {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status attached to the error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            WikidotError::Request { status, .. } => Some(*status),
            WikidotError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Convenience result type.
pub type WikidotResult<T> = Result<T, WikidotError>;
