use crate::{Strategy, UnitId};

/// One schedulable unit of work.
///
/// Built once during discovery and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Logical service name, used for display and notification.
    pub service: String,
    /// Runtime handle of the unit the task operates on.
    pub container: UnitId,
    /// Cron expression.
    pub schedule: String,
    /// How the task is executed.
    pub strategy: Strategy,
}

impl Task {
    pub fn new(
        service: impl Into<String>,
        container: impl Into<UnitId>,
        schedule: impl Into<String>,
        strategy: Strategy,
    ) -> Self {
        Self {
            service: service.into(),
            container: container.into(),
            schedule: schedule.into(),
            strategy,
        }
    }
}
