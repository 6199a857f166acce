use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use csched_model::{Strategy, Task};

/// Per-run failure. Recorded in the outcome, never propagated past the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    #[error("{0}")]
    Failed(String),
    #[error("cancelled")]
    Cancelled,
    #[error("no runner for strategy {0}")]
    NoRunner(&'static str),
}

/// Execution backend for one [`Strategy`].
///
/// Runners must observe `cancel` during every blocking wait and return
/// [`RunnerError::Cancelled`] promptly once it fires.
#[async_trait]
pub trait Runner: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn supports(&self, strategy: &Strategy) -> bool;

    async fn run(&self, task: &Task, cancel: &CancellationToken) -> Result<(), RunnerError>;
}
