use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use csched_model::{Payload, Project, Task};
use csched_notify::Notify;

use crate::{Job, RunGuard, RunnerRouter, Trigger};

/// Scheduling entry of one task: its trigger, its single-flight guard and where outcomes go.
pub struct TaskJob {
    project: Project,
    task: Task,
    trigger: Trigger,
    guard: RunGuard,
    router: Arc<RunnerRouter>,
    notifier: Option<Arc<dyn Notify>>,
}

impl TaskJob {
    pub fn new(
        project: Project,
        task: Task,
        trigger: Trigger,
        router: Arc<RunnerRouter>,
        notifier: Option<Arc<dyn Notify>>,
    ) -> Self {
        Self {
            project,
            task,
            trigger,
            guard: RunGuard::new(),
            router,
            notifier,
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    /// One trigger of the task.
    ///
    /// Returns `None` when the previous run still holds the guard; nothing is executed or
    /// reported in that case.
    pub async fn execute(&self, cancel: &CancellationToken) -> Option<Payload> {
        let Some(permit) = self.guard.try_acquire() else {
            info!(service = %self.task.service, "skipped: previous run still in progress");
            return None;
        };

        info!(service = %self.task.service, kind = self.task.strategy.kind(), "started");
        let started = OffsetDateTime::now_utc();
        let clock = Instant::now();
        let result = self.router.run(&self.task, cancel).await;
        let finished = OffsetDateTime::now_utc();
        drop(permit);

        let elapsed_ms = clock.elapsed().as_millis() as u64;
        let error = match result {
            Ok(()) => {
                info!(service = %self.task.service, elapsed_ms, "finished");
                None
            }
            Err(e) => {
                warn!(service = %self.task.service, elapsed_ms, error = %e, "failed");
                Some(e.to_string())
            }
        };

        let payload = Payload::new(&self.project, &self.task, started, finished, error);
        if let Some(notifier) = &self.notifier {
            match notifier.notify(&payload, cancel).await {
                Ok(()) => info!(service = %self.task.service, "notification sent"),
                Err(e) => warn!(service = %self.task.service, error = %e, "notification failed"),
            }
        }
        Some(payload)
    }
}

#[async_trait]
impl Job for TaskJob {
    async fn fire(&self, cancel: CancellationToken) {
        self.execute(&cancel).await;
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fmt,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use csched_model::Strategy;
    use tracing::{
        Event, Level, Subscriber,
        field::{Field, Visit},
    };
    use tracing_subscriber::{
        Registry,
        layer::{Context, Layer, SubscriberExt},
    };

    use super::*;
    use crate::{Runner, RunnerError, testing::RecordingNotifier};

    struct Scripted {
        runs: AtomicUsize,
        hold: Duration,
        result: Result<(), RunnerError>,
    }

    impl Scripted {
        fn new(hold: Duration, result: Result<(), RunnerError>) -> Arc<Self> {
            Arc::new(Self {
                runs: AtomicUsize::new(0),
                hold,
                result,
            })
        }
    }

    #[async_trait]
    impl Runner for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }
        fn supports(&self, _strategy: &Strategy) -> bool {
            true
        }
        async fn run(&self, _task: &Task, cancel: &CancellationToken) -> Result<(), RunnerError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            tokio::select! {
                _ = tokio::time::sleep(self.hold) => self.result.clone(),
                _ = cancel.cancelled() => Err(RunnerError::Cancelled),
            }
        }
    }

    /// Level and message of every event seen while installed.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(Level, String)>>>);

    struct Message(String);

    impl Visit for Message {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for Captured {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut message = Message(String::new());
            event.record(&mut message);
            self.0
                .lock()
                .unwrap()
                .push((*event.metadata().level(), message.0));
        }
    }

    fn job(runner: Arc<Scripted>, notifier: Option<Arc<dyn Notify>>) -> TaskJob {
        let task = Task::new("backup", "c0ffee", "@every 1s", Strategy::Run);
        let trigger = Trigger::parse(&task.schedule).unwrap();
        TaskJob::new(
            "demo".into(),
            task,
            trigger,
            Arc::new(RunnerRouter::new().with(runner)),
            notifier,
        )
    }

    #[tokio::test]
    async fn overlapping_trigger_is_skipped() {
        let runner = Scripted::new(Duration::from_millis(100), Ok(()));
        let job = job(runner.clone(), None);
        let cancel = CancellationToken::new();

        let (a, b) = tokio::join!(job.execute(&cancel), job.execute(&cancel));

        assert_eq!(runner.runs.load(Ordering::SeqCst), 1);
        assert_eq!(a.is_some() as u8 + b.is_some() as u8, 1);
        assert!(!job.is_running());
    }

    #[tokio::test]
    async fn guard_released_after_failure() {
        let runner = Scripted::new(
            Duration::ZERO,
            Err(RunnerError::Failed("service backup: status code 1".into())),
        );
        let job = job(runner.clone(), None);
        let cancel = CancellationToken::new();

        let first = job.execute(&cancel).await.expect("idle guard");
        assert!(first.failed);
        assert_eq!(first.error.as_deref(), Some("service backup: status code 1"));
        assert!(!job.is_running());

        assert!(job.execute(&cancel).await.is_some());
        assert_eq!(runner.runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn success_payload() {
        let notifier = Arc::new(RecordingNotifier::new());
        let job = job(Scripted::new(Duration::from_millis(20), Ok(())), Some(notifier.clone()));

        let payload = job.execute(&CancellationToken::new()).await.unwrap();
        assert!(!payload.failed);
        assert_eq!(payload.error, None);
        assert_eq!(payload.project, "demo");
        assert_eq!(payload.container, "c0ffee");
        assert_eq!(payload.schedule, "@every 1s");
        assert!(payload.finished >= payload.started);

        assert_eq!(notifier.payloads(), vec![payload]);
    }

    #[tokio::test]
    async fn notification_failure_does_not_change_outcome() {
        let notifier = Arc::new(RecordingNotifier::failing(1));
        let job = job(Scripted::new(Duration::ZERO, Ok(())), Some(notifier.clone()));

        let payload = job.execute(&CancellationToken::new()).await.unwrap();
        assert!(!payload.failed);
        assert_eq!(notifier.payloads().len(), 1);
        assert!(!job.is_running());
    }

    #[tokio::test]
    async fn delivered_notification_is_logged_at_info() {
        let captured = Captured::default();
        let _guard = tracing::subscriber::set_default(Registry::default().with(captured.clone()));

        let notifier = Arc::new(RecordingNotifier::new());
        let job = job(Scripted::new(Duration::ZERO, Ok(())), Some(notifier.clone()));
        job.execute(&CancellationToken::new()).await.unwrap();

        let events = captured.0.lock().unwrap().clone();
        assert!(
            events.contains(&(Level::INFO, "notification sent".to_string())),
            "{events:?}"
        );
    }

    #[tokio::test]
    async fn no_notifier_still_completes() {
        let runner = Scripted::new(Duration::ZERO, Ok(()));
        let job = job(runner.clone(), None);
        assert!(job.execute(&CancellationToken::new()).await.is_some());
        assert_eq!(runner.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_is_a_failed_run() {
        let job = job(Scripted::new(Duration::from_secs(60), Ok(())), None);
        let cancel = CancellationToken::new();
        let stop = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stop.cancel();
        });

        let payload = tokio::time::timeout(Duration::from_secs(5), job.execute(&cancel))
            .await
            .expect("run must observe cancellation")
            .unwrap();
        assert!(payload.failed);
        assert_eq!(payload.error.as_deref(), Some("cancelled"));
    }

    #[tokio::test]
    async fn missing_runner_is_a_failed_run() {
        let task = Task::new("web", "c1", "@hourly", Strategy::Run);
        let trigger = Trigger::parse(&task.schedule).unwrap();
        let job = TaskJob::new("demo".into(), task, trigger, Arc::new(RunnerRouter::new()), None);

        let payload = job.execute(&CancellationToken::new()).await.unwrap();
        assert!(payload.failed);
        assert_eq!(payload.error.as_deref(), Some("no runner for strategy run"));
    }
}
