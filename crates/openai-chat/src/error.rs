use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid client configuration: {0}")]
    Config(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode completion response: {source}\n  body: {body}")]
    Decode {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no response choices returned")]
    EmptyResponse,
}

impl ChatError {
    /// Map a transport error, keeping timeouts distinguishable from other
    /// network failures.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Timeout
        } else {
            ChatError::Http(err)
        }
    }
}
