use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use csched_core::{Runner, RunnerError, Runtime};
use csched_model::{Strategy, Task};

use crate::{
    cancel::cancellable,
    error::{ExecError, ExecResult},
};

/// Runner for [`Strategy::Run`]: start the unit and block until it stops.
pub struct StartRunner {
    name: &'static str,
    runtime: Arc<dyn Runtime>,
}

impl StartRunner {
    pub fn new(runtime: Arc<dyn Runtime>) -> Self {
        Self {
            name: "start",
            runtime,
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    async fn start_and_wait(&self, task: &Task, cancel: &CancellationToken) -> ExecResult<()> {
        if !self.supports(&task.strategy) {
            return Err(ExecError::UnsupportedStrategy(task.strategy.kind()));
        }

        trace!(target: "csched.exec.start", container = %task.container, "start");
        let service = &task.service;
        cancellable(cancel, self.runtime.start(&task.container), |source| {
            ExecError::Start {
                service: service.clone(),
                source,
            }
        })
        .await?;
        let status = cancellable(cancel, self.runtime.wait(&task.container), |source| {
            ExecError::Wait {
                service: service.clone(),
                source,
            }
        })
        .await?;

        if let Some(message) = status.error.filter(|m| !m.is_empty()) {
            return Err(ExecError::ServiceError {
                service: task.service.clone(),
                message,
            });
        }
        if status.status_code != 0 {
            return Err(ExecError::ServiceStatus {
                service: task.service.clone(),
                code: status.status_code,
            });
        }

        debug!(target: "csched.exec.start", container = %task.container, "exit success");
        Ok(())
    }
}

#[async_trait]
impl Runner for StartRunner {
    fn name(&self) -> &'static str {
        self.name
    }

    fn supports(&self, strategy: &Strategy) -> bool {
        matches!(strategy, Strategy::Run)
    }

    async fn run(&self, task: &Task, cancel: &CancellationToken) -> Result<(), RunnerError> {
        self.start_and_wait(task, cancel).await.map_err(Into::into)
    }
}
