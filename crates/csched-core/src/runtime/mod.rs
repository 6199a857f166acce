//! Control API of the workload runtime, as consumed by the scheduler.
//!
//! The scheduler never talks to a concrete runtime directly; discovery, the project resolver and
//! every runner go through [`Runtime`].

mod error;
pub use error::RuntimeError;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;

use csched_model::{Labels, UnitId};

/// Combined stdout/stderr of an attached exec.
pub type OutputStream = BoxStream<'static, Result<Bytes, RuntimeError>>;

/// A unit returned by [`Runtime::list_units`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSummary {
    pub id: UnitId,
    pub labels: Labels,
}

impl UnitSummary {
    pub fn new(id: impl Into<UnitId>, labels: Labels) -> Self {
        Self {
            id: id.into(),
            labels,
        }
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Result of waiting for a unit to leave the running state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitStatus {
    pub status_code: i64,
    /// Failure reported by the runtime itself, independent of the status code.
    pub error: Option<String>,
}

impl WaitStatus {
    pub fn exited(status_code: i64) -> Self {
        Self {
            status_code,
            error: None,
        }
    }
}

#[async_trait]
pub trait Runtime: Send + Sync + 'static {
    /// Units (running or not) whose project label equals `project` and which carry both the
    /// service and the schedule labels.
    async fn list_units(&self, project: &str) -> Result<Vec<UnitSummary>, RuntimeError>;

    /// Label map of a single unit.
    async fn inspect_labels(&self, id: &str) -> Result<Labels, RuntimeError>;

    async fn start(&self, id: &str) -> Result<(), RuntimeError>;

    /// Block until the unit is no longer running.
    async fn wait(&self, id: &str) -> Result<WaitStatus, RuntimeError>;

    /// Create an exec invocation; returns its id.
    async fn exec_create(
        &self,
        id: &str,
        command: &[String],
        attach: bool,
    ) -> Result<String, RuntimeError>;

    /// Start an exec detached; returns as soon as the runtime accepted it.
    async fn exec_start(&self, exec_id: &str) -> Result<(), RuntimeError>;

    /// Start an exec attached; the stream ends when the command exits.
    async fn exec_attach(&self, exec_id: &str) -> Result<OutputStream, RuntimeError>;

    /// Exit code of a finished exec; `None` while it is still running.
    async fn exec_exit_code(&self, exec_id: &str) -> Result<Option<i64>, RuntimeError>;
}
