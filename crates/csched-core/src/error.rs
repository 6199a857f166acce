use thiserror::Error;

use csched_model::ModelError;

use crate::RuntimeError;

/// Startup-fatal errors: anything here aborts the scheduler before the engine starts.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to detect self container id")]
    SelfIdentity,

    #[error("inspect self container {id}: {source}")]
    InspectSelf {
        id: String,
        #[source]
        source: RuntimeError,
    },

    #[error("container {0} has no project label, probably not part of a compose project")]
    NotInProject(String),

    #[error("list tasks: {0}")]
    Discovery(#[source] RuntimeError),

    #[error("parse command in service {service}: {source}")]
    Command {
        service: String,
        #[source]
        source: ModelError,
    },

    #[error("add service {service}: invalid schedule {schedule:?}: {reason}")]
    Schedule {
        service: String,
        schedule: String,
        reason: String,
    },
}
