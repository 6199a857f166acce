use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{instrument, trace};

use csched_model::{Strategy, Task};

use crate::runner::{Runner, RunnerError};

/// Dispatches a task to the first registered runner supporting its strategy.
#[derive(Default)]
pub struct RunnerRouter {
    runners: Vec<Arc<dyn Runner>>,
}

impl RunnerRouter {
    #[inline]
    pub fn new() -> Self {
        Self {
            runners: Vec::new(),
        }
    }

    #[inline]
    pub fn register(&mut self, runner: Arc<dyn Runner>) {
        self.runners.push(runner);
    }

    #[inline]
    pub fn with(mut self, runner: Arc<dyn Runner>) -> Self {
        self.register(runner);
        self
    }

    pub fn pick(&self, strategy: &Strategy) -> Option<&Arc<dyn Runner>> {
        self.runners.iter().find(|r| r.supports(strategy))
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    #[instrument(
        level = "trace",
        skip_all,
        fields(service = %task.service, kind = task.strategy.kind())
    )]
    pub async fn run(&self, task: &Task, cancel: &CancellationToken) -> Result<(), RunnerError> {
        let r = self
            .pick(&task.strategy)
            .ok_or(RunnerError::NoRunner(task.strategy.kind()))?;

        trace!(runner = r.name(), "runner picked");
        r.run(task, cancel).await
    }
}
