use thiserror::Error;

use csched_core::{RunnerError, RuntimeError};

/// Failure of one run; runtime failures name the service and the step that failed.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("unsupported strategy {0} for this runner")]
    UnsupportedStrategy(&'static str),
    #[error("start service {service}: {source}")]
    Start {
        service: String,
        #[source]
        source: RuntimeError,
    },
    #[error("wait for service {service}: {source}")]
    Wait {
        service: String,
        #[source]
        source: RuntimeError,
    },
    #[error("service {service}: status code {code}")]
    ServiceStatus { service: String, code: i64 },
    #[error("service {service}: {message}")]
    ServiceError { service: String, message: String },
    #[error("create exec for {service}: {source}")]
    CreateExec {
        service: String,
        #[source]
        source: RuntimeError,
    },
    #[error("start exec for {service}: {source}")]
    StartExec {
        service: String,
        #[source]
        source: RuntimeError,
    },
    #[error("read output of {service}: {source}")]
    Output {
        service: String,
        #[source]
        source: RuntimeError,
    },
    #[error("inspect exec for {service}: {source}")]
    InspectExec {
        service: String,
        #[source]
        source: RuntimeError,
    },
    #[error("command returned non-zero code {code}")]
    NonZeroExit { code: i64 },
    #[error("command exit code is unknown")]
    ExitCodeUnknown,
    #[error("cancelled")]
    Cancelled,
}

pub type ExecResult<T> = Result<T, ExecError>;

impl From<ExecError> for RunnerError {
    fn from(e: ExecError) -> Self {
        match e {
            ExecError::Cancelled => RunnerError::Cancelled,
            other => RunnerError::Failed(other.to_string()),
        }
    }
}
