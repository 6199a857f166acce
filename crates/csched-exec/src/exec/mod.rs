//! Runners for [`Strategy::Exec`]: a command inside an already running unit.
//!
//! The silent variant ([`ExecRunner`]) only checks that the runtime accepted the invocation; the
//! exit code of the command is never inspected. The logging variant ([`AttachRunner`]) streams
//! the output and fails on a non-zero exit code.

mod attach;
pub use attach::AttachRunner;

mod sink;
pub use sink::{OutputSink, TracingSink};

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

/// Fire-and-forget exec.
pub struct ExecRunner {
    name: &'static str,
    runtime: Arc<dyn Runtime>,
}

impl ExecRunner {
    pub fn new(runtime: Arc<dyn Runtime>) -> Self {
        Self {
            name: "exec",
            runtime,
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    async fn exec(&self, task: &Task, cancel: &CancellationToken) -> ExecResult<()> {
        if !self.supports(&task.strategy) {
            return Err(ExecError::UnsupportedStrategy(task.strategy.kind()));
        }
        let command = task.strategy.command();

        trace!(target: "csched.exec.exec", container = %task.container, ?command, "create");
        let service = &task.service;
        let exec_id = cancellable(
            cancel,
            self.runtime.exec_create(&task.container, command, false),
            |source| ExecError::CreateExec {
                service: service.clone(),
                source,
            },
        )
        .await?;
        cancellable(cancel, self.runtime.exec_start(&exec_id), |source| {
            ExecError::StartExec {
                service: service.clone(),
                source,
            }
        })
        .await?;

        debug!(
            target: "csched.exec.exec",
            container = %task.container,
            exec_id,
            "started detached"
        );
        Ok(())
    }
}

#[async_trait]
impl Runner for ExecRunner {
    fn name(&self) -> &'static str {
        self.name
    }

    fn supports(&self, strategy: &Strategy) -> bool {
        matches!(strategy, Strategy::Exec { logging: false, .. })
    }

    async fn run(&self, task: &Task, cancel: &CancellationToken) -> Result<(), RunnerError> {
        self.exec(task, cancel).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use csched_core::testing::{Call, FakeExec, FakeRuntime};

    use super::*;

    fn task() -> Task {
        Task::new(
            "web",
            "c1",
            "@hourly",
            Strategy::from_command(vec!["sh".into(), "-c".into(), "exit 3".into()], false),
        )
    }

    #[tokio::test]
    async fn success_means_started() {
        let rt = FakeRuntime::new().with_exec(
            "c1",
            FakeExec {
                exit_code: Some(3),
                ..Default::default()
            },
        );
        let runner = ExecRunner::new(Arc::new(rt.clone()));

        // the command's own exit code is not inspected in this mode
        assert_eq!(runner.run(&task(), &CancellationToken::new()).await, Ok(()));
        assert_eq!(
            rt.calls(),
            vec![
                Call::ExecCreate {
                    id: "c1".into(),
                    command: vec!["sh".into(), "-c".into(), "exit 3".into()],
                    attach: false,
                },
                Call::ExecStart("exec-1".into()),
            ]
        );
    }

    #[tokio::test]
    async fn start_failure_fails() {
        let rt = FakeRuntime::new().with_exec(
            "c1",
            FakeExec {
                start_error: Some("container is not running".into()),
                ..Default::default()
            },
        );
        let err = ExecRunner::new(Arc::new(rt))
            .run(&task(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RunnerError::Failed("start exec for web: container is not running".into())
        );
    }

    #[tokio::test]
    async fn unknown_unit_fails() {
        let err = ExecRunner::new(Arc::new(FakeRuntime::new()))
            .run(&task(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RunnerError::Failed("create exec for web: no such unit: c1".into())
        );
    }

    #[test]
    fn supports_only_silent_exec() {
        let runner = ExecRunner::new(Arc::new(FakeRuntime::new()));
        assert!(runner.supports(&Strategy::from_command(vec!["date".into()], false)));
        assert!(!runner.supports(&Strategy::from_command(vec!["date".into()], true)));
        assert!(!runner.supports(&Strategy::Run));
    }
}
