use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("malformed command {raw:?}: {reason}")]
    MalformedCommand { raw: String, reason: String },
}
