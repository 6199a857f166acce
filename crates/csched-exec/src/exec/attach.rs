use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use csched_core::{Runner, RunnerError, Runtime};
use csched_model::{Strategy, Task};

use super::sink::{LineBuffer, OutputSink, TracingSink};
use crate::{
    cancel::cancellable,
    error::{ExecError, ExecResult},
};

/// The runtime may report the exit code a moment after the output stream closed.
const EXIT_CODE_POLLS: u32 = 10;
const EXIT_CODE_POLL_DELAY: Duration = Duration::from_millis(100);

/// Attached exec: output goes to an [`OutputSink`] while the command runs, then the exit code
/// decides the outcome.
pub struct AttachRunner {
    name: &'static str,
    runtime: Arc<dyn Runtime>,
    sink: Arc<dyn OutputSink>,
}

impl AttachRunner {
    pub fn new(runtime: Arc<dyn Runtime>) -> Self {
        Self {
            name: "exec-attach",
            runtime,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = sink;
        self
    }

    async fn exec(&self, task: &Task, cancel: &CancellationToken) -> ExecResult<()> {
        if !self.supports(&task.strategy) {
            return Err(ExecError::UnsupportedStrategy(task.strategy.kind()));
        }
        let command = task.strategy.command();

        trace!(target: "csched.exec.attach", container = %task.container, ?command, "create");
        let service = &task.service;
        let exec_id = cancellable(
            cancel,
            self.runtime.exec_create(&task.container, command, true),
            |source| ExecError::CreateExec {
                service: service.clone(),
                source,
            },
        )
        .await?;
        let mut output = cancellable(cancel, self.runtime.exec_attach(&exec_id), |source| {
            ExecError::StartExec {
                service: service.clone(),
                source,
            }
        })
        .await?;

        let mut lines = LineBuffer::default();
        let emit = |line: &str| self.sink.line(&task.service, line);
        loop {
            let chunk = tokio::select! {
                next = output.next() => next,
                _ = cancel.cancelled() => return Err(ExecError::Cancelled),
            };
            match chunk {
                Some(Ok(bytes)) => lines.push(&bytes, emit),
                Some(Err(source)) => {
                    return Err(ExecError::Output {
                        service: service.clone(),
                        source,
                    });
                }
                None => break,
            }
        }
        lines.flush(emit);

        let code = self.exit_code(service, &exec_id, cancel).await?;
        if code != 0 {
            return Err(ExecError::NonZeroExit { code });
        }
        debug!(
            target: "csched.exec.attach",
            container = %task.container,
            exec_id,
            "exit success"
        );
        Ok(())
    }

    async fn exit_code(
        &self,
        service: &str,
        exec_id: &str,
        cancel: &CancellationToken,
    ) -> ExecResult<i64> {
        for _ in 0..EXIT_CODE_POLLS {
            let code = cancellable(cancel, self.runtime.exec_exit_code(exec_id), |source| {
                ExecError::InspectExec {
                    service: service.to_string(),
                    source,
                }
            })
            .await?;
            if let Some(code) = code {
                return Ok(code);
            }
            tokio::select! {
                _ = tokio::time::sleep(EXIT_CODE_POLL_DELAY) => {}
                _ = cancel.cancelled() => return Err(ExecError::Cancelled),
            }
        }
        Err(ExecError::ExitCodeUnknown)
    }
}

#[async_trait]
impl Runner for AttachRunner {
    fn name(&self) -> &'static str {
        self.name
    }

    fn supports(&self, strategy: &Strategy) -> bool {
        matches!(strategy, Strategy::Exec { logging: true, .. })
    }

    async fn run(&self, task: &Task, cancel: &CancellationToken) -> Result<(), RunnerError> {
        self.exec(task, cancel).await.map_err(Into::into)
    }
}
