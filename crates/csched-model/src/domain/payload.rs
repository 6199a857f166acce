use serde::Serialize;
use time::OffsetDateTime;

use crate::Task;

/// Outcome of one completed execution, delivered to the notification sink.
///
/// `error` is present if and only if `failed` is `true`; build it through [`Payload::new`] to
/// keep that invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payload {
    /// Project scope of the scheduler.
    pub project: String,
    /// Service name of the task.
    pub service: String,
    /// Runtime handle of the unit.
    pub container: String,
    /// Cron expression the run was triggered by.
    pub schedule: String,
    /// When the execution started.
    #[serde(with = "time::serde::rfc3339")]
    pub started: OffsetDateTime,
    /// When the execution returned.
    #[serde(with = "time::serde::rfc3339")]
    pub finished: OffsetDateTime,
    /// Whether the execution failed.
    pub failed: bool,
    /// Failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Payload {
    pub fn new(
        project: &str,
        task: &Task,
        started: OffsetDateTime,
        finished: OffsetDateTime,
        error: Option<String>,
    ) -> Self {
        Self {
            project: project.to_string(),
            service: task.service.clone(),
            container: task.container.clone(),
            schedule: task.schedule.clone(),
            started,
            finished,
            failed: error.is_some(),
            error,
        }
    }
}
