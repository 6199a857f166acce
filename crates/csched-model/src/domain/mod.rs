mod labels;
pub use labels::{
    LABEL_COMMAND, LABEL_LOGS, LABEL_PROJECT, LABEL_SCHEDULE, LABEL_SERVICE, Labels, parse_flag,
};

mod task;
pub use task::Task;

mod payload;
pub use payload::Payload;

/// Opaque runtime handle of a unit (container id).
pub type UnitId = String;

/// Project scope used to filter discoverable tasks.
pub type Project = String;
