use tracing::debug;

use csched_model::{
    LABEL_COMMAND, LABEL_LOGS, LABEL_PROJECT, LABEL_SCHEDULE, LABEL_SERVICE, Strategy, Task,
    parse_flag, split_command,
};

use crate::{CoreError, Runtime, UnitSummary};

/// Query the runtime once and materialize every schedulable unit of `project` into a [`Task`].
///
/// A malformed command label aborts discovery as a whole.
pub async fn discover_tasks(runtime: &dyn Runtime, project: &str) -> Result<Vec<Task>, CoreError> {
    let units = runtime
        .list_units(project)
        .await
        .map_err(CoreError::Discovery)?;

    let mut tasks = Vec::with_capacity(units.len());
    for unit in &units {
        if let Some(task) = task_from_unit(project, unit)? {
            tasks.push(task);
        }
    }
    debug!(project, units = units.len(), tasks = tasks.len(), "discovery finished");
    Ok(tasks)
}

/// `Ok(None)` when the unit is not a schedulable member of `project`.
pub fn task_from_unit(project: &str, unit: &UnitSummary) -> Result<Option<Task>, CoreError> {
    if unit.label(LABEL_PROJECT) != Some(project) {
        return Ok(None);
    }
    let Some(service) = unit.label(LABEL_SERVICE) else {
        return Ok(None);
    };
    let schedule = match unit.label(LABEL_SCHEDULE) {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Ok(None),
    };

    let command = match unit.label(LABEL_COMMAND) {
        Some(raw) if !raw.is_empty() => {
            split_command(raw).map_err(|source| CoreError::Command {
                service: service.to_string(),
                source,
            })?
        }
        _ => Vec::new(),
    };
    let logging = unit.label(LABEL_LOGS).and_then(parse_flag).unwrap_or(false);

    Ok(Some(Task::new(
        service,
        unit.id.clone(),
        schedule,
        Strategy::from_command(command, logging),
    )))
}
