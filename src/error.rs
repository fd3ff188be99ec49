use thiserror::Error;

/// Failures talking to the board backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// Non-2xx response. `message` is the body's `error` field, or the
    /// operation's fallback text when the body has none.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text shown to the user next to the field or in the footer.
    pub fn display_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
