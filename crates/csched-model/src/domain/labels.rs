use std::collections::HashMap;

/// Label map attached to a runtime unit.
pub type Labels = HashMap<String, String>;

/// Project membership of a unit.
pub const LABEL_PROJECT: &str = "com.docker.compose.project";
/// Logical service name of a unit.
pub const LABEL_SERVICE: &str = "com.docker.compose.service";
/// Cron expression; a unit is schedulable only when this label is non-empty.
pub const LABEL_SCHEDULE: &str = "net.reddec.scheduler.cron";
/// Optional shell-quoted command executed inside the running unit.
pub const LABEL_COMMAND: &str = "net.reddec.scheduler.exec";
/// Optional boolean: stream exec output to the scheduler log.
pub const LABEL_LOGS: &str = "net.reddec.scheduler.logs";

/// Parse a boolean label value.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`; anything else is `None`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
