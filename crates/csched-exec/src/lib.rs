mod cancel;

mod error;
pub use error::{ExecError, ExecResult};

pub mod start;
pub use start::StartRunner;

pub mod exec;
pub use exec::{AttachRunner, ExecRunner, OutputSink, TracingSink};

#[cfg(feature = "docker")]
pub mod docker;
#[cfg(feature = "docker")]
pub use docker::DockerRuntime;

use std::sync::Arc;

use csched_core::{RunnerRouter, Runtime};

/// Register one runner per strategy, all sharing `runtime`.
pub fn register_runners(router: &mut RunnerRouter, runtime: Arc<dyn Runtime>) {
    router.register(Arc::new(StartRunner::new(Arc::clone(&runtime))));
    router.register(Arc::new(ExecRunner::new(Arc::clone(&runtime))));
    router.register(Arc::new(AttachRunner::new(runtime)));
}

pub mod prelude {
    pub use crate::error::{ExecError, ExecResult};
    pub use crate::{AttachRunner, ExecRunner, StartRunner, register_runners};
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::Bytes;
    use csched_core::{
        Scheduler, Trigger,
        scheduler::TaskJob,
        testing::{Call, FakeExec, FakeRuntime, FakeWait, RecordingNotifier},
    };
    use csched_model::{Strategy, Task};
    use tokio_util::sync::CancellationToken;

    use super::*;

    fn router(rt: &FakeRuntime) -> Arc<RunnerRouter> {
        let mut router = RunnerRouter::new();
        register_runners(&mut router, Arc::new(rt.clone()));
        Arc::new(router)
    }

    async fn outcome(rt: &FakeRuntime, task: Task) -> csched_model::Payload {
        let notifier = Arc::new(RecordingNotifier::new());
        let trigger = Trigger::parse(&task.schedule).unwrap();
        let job = TaskJob::new("demo".into(), task, trigger, router(rt), Some(notifier.clone()));
        let payload = job.execute(&CancellationToken::new()).await.unwrap();
        assert_eq!(notifier.payloads(), vec![payload.clone()]);
        payload
    }

    #[test]
    fn every_strategy_has_a_runner() {
        let router = router(&FakeRuntime::new());
        assert_eq!(router.len(), 3);
        assert_eq!(router.pick(&Strategy::Run).unwrap().name(), "start");
        let silent = Strategy::from_command(vec!["date".into()], false);
        assert_eq!(router.pick(&silent).unwrap().name(), "exec");
        let attached = Strategy::from_command(vec!["date".into()], true);
        assert_eq!(router.pick(&attached).unwrap().name(), "exec-attach");
    }

    #[tokio::test]
    async fn run_exit_zero_succeeds() {
        let rt = FakeRuntime::new().with_wait("c1", FakeWait::Exit(0));
        let payload = outcome(&rt, Task::new("job", "c1", "@daily", Strategy::Run)).await;
        assert!(!payload.failed);
        assert_eq!(payload.error, None);
    }

    #[tokio::test]
    async fn run_exit_one_fails() {
        let rt = FakeRuntime::new().with_wait("c1", FakeWait::Exit(1));
        let payload = outcome(&rt, Task::new("job", "c1", "@daily", Strategy::Run)).await;
        assert!(payload.failed);
        assert!(payload.error.unwrap().contains("status code 1"));
    }

    #[tokio::test]
    async fn attached_exec_exit_two_fails() {
        let rt = FakeRuntime::new().with_exec(
            "c1",
            FakeExec {
                output: vec![Bytes::from_static(b"partial work\n")],
                exit_code: Some(2),
                start_error: None,
            },
        );
        let task = Task::new(
            "job",
            "c1",
            "@daily",
            Strategy::from_command(vec!["false".into()], true),
        );
        let payload = outcome(&rt, task).await;
        assert!(payload.failed);
        assert!(payload.error.unwrap().contains("code 2"));
    }

    #[tokio::test]
    async fn silent_exec_ignores_exit_code() {
        let rt = FakeRuntime::new().with_exec(
            "c1",
            FakeExec {
                exit_code: Some(2),
                ..Default::default()
            },
        );
        let task = Task::new(
            "job",
            "c1",
            "@daily",
            Strategy::from_command(vec!["false".into()], false),
        );
        let payload = outcome(&rt, task).await;
        assert!(!payload.failed);
    }

    #[tokio::test]
    async fn scheduler_drives_runners_until_cancelled() {
        let rt = FakeRuntime::new().with_wait("c1", FakeWait::Exit(0));
        let start = StartRunner::new(Arc::new(rt.clone()));
        let scheduler = Scheduler::builder(Arc::new(rt.clone()))
            .with_project("demo")
            .with_router(RunnerRouter::new().with(Arc::new(start)))
            .build()
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let stop = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            stop.cancel();
        });
        let tasks = vec![Task::new("job", "c1", "@every 30ms", Strategy::Run)];
        scheduler.serve(tasks, cancel).await.unwrap();

        let starts = rt
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Start(_)))
            .count();
        assert!(starts >= 2, "started only {starts} times");
    }
}
