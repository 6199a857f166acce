//! Scheduler aggregate.
//!
//! [`Scheduler::serve`] validates every schedule up front, registers one [`TaskJob`] per task on a
//! shared [`CronEngine`] and runs it until the cancellation token fires. Each job owns the
//! [`RunGuard`] of its task, so overlapping triggers of the same task are skipped rather than
//! queued.

mod job;
pub use job::TaskJob;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use csched_model::{Project, Task};
use csched_notify::Notify;

use crate::{
    CoreError, CronEngine, IdentityProbe, Runtime, RunnerRouter, Trigger, default_probes,
    discover_tasks, resolve_project,
};

pub struct SchedulerBuilder {
    runtime: Arc<dyn Runtime>,
    router: RunnerRouter,
    project: Option<Project>,
    notifier: Option<Arc<dyn Notify>>,
    probes: Vec<Box<dyn IdentityProbe>>,
}

impl SchedulerBuilder {
    /// Fixed project scope; skips self-identification.
    pub fn with_project(mut self, project: impl Into<Project>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notify>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_router(mut self, router: RunnerRouter) -> Self {
        self.router = router;
        self
    }

    /// Replace the self-identification probes, tried in order.
    pub fn with_probes(mut self, probes: Vec<Box<dyn IdentityProbe>>) -> Self {
        self.probes = probes;
        self
    }

    /// Resolve the project scope when none was configured.
    pub async fn build(self) -> Result<Scheduler, CoreError> {
        let project = match self.project.filter(|p| !p.is_empty()) {
            Some(project) => project,
            None => resolve_project(self.runtime.as_ref(), &self.probes).await?,
        };

        Ok(Scheduler {
            project,
            runtime: self.runtime,
            router: Arc::new(self.router),
            notifier: self.notifier,
        })
    }
}

pub struct Scheduler {
    project: Project,
    runtime: Arc<dyn Runtime>,
    router: Arc<RunnerRouter>,
    notifier: Option<Arc<dyn Notify>>,
}

impl Scheduler {
    pub fn builder(runtime: Arc<dyn Runtime>) -> SchedulerBuilder {
        SchedulerBuilder {
            runtime,
            router: RunnerRouter::new(),
            project: None,
            notifier: None,
            probes: default_probes(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub async fn discover(&self) -> Result<Vec<Task>, CoreError> {
        discover_tasks(self.runtime.as_ref(), &self.project).await
    }

    /// Discover tasks once and serve them until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), CoreError> {
        let tasks = self.discover().await?;
        self.serve(tasks, cancel).await
    }

    /// Returns once `cancel` fired and every in-flight run has finished.
    ///
    /// Fails before anything is scheduled if any schedule does not parse.
    pub async fn serve(
        &self,
        tasks: Vec<Task>,
        cancel: CancellationToken,
    ) -> Result<(), CoreError> {
        let mut engine = CronEngine::new();
        for job in self.jobs(tasks)? {
            engine.add(job.task().service.clone(), job.trigger().clone(), Arc::new(job));
        }

        info!(project = %self.project, tasks = engine.len(), "scheduler started");
        engine.run(cancel).await;
        info!(project = %self.project, "scheduler stopped");
        Ok(())
    }

    fn jobs(&self, tasks: Vec<Task>) -> Result<Vec<TaskJob>, CoreError> {
        let mut jobs = Vec::with_capacity(tasks.len());
        for task in tasks {
            let trigger = Trigger::parse(&task.schedule).map_err(|reason| CoreError::Schedule {
                service: task.service.clone(),
                schedule: task.schedule.clone(),
                reason,
            })?;
            info!(
                service = %task.service,
                container = %task.container,
                schedule = %task.schedule,
                kind = task.strategy.kind(),
                logging = task.strategy.logging(),
                "task registered"
            );
            jobs.push(TaskJob::new(
                self.project.clone(),
                task,
                trigger,
                Arc::clone(&self.router),
                self.notifier.clone(),
            ));
        }
        Ok(jobs)
    }
}
