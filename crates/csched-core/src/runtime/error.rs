use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("connect to runtime: {0}")]
    Connect(String),
    #[error("no such unit: {0}")]
    NotFound(String),
    #[error("{0}")]
    Api(String),
}
