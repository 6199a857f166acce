use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid notification url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid http method: {0:?}")]
    InvalidMethod(String),

    #[error("create http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("marshal: {0}")]
    Marshal(#[from] serde_json::Error),

    #[error("execute request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("status: {0}")]
    Status(u16),

    #[error("cancelled")]
    Cancelled,

    #[error("all attempts failed")]
    Exhausted,
}
