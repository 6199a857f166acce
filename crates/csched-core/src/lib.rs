pub mod error;
pub use error::CoreError;

pub mod runtime;
pub use runtime::{OutputStream, Runtime, RuntimeError, UnitSummary, WaitStatus};

pub mod runner;
pub use runner::{Runner, RunnerError};

pub mod router;
pub use router::RunnerRouter;

pub mod guard;
pub use guard::{RunGuard, RunPermit};

pub mod engine;
pub use engine::{CronEngine, Job, Trigger};

pub mod discovery;
pub use discovery::discover_tasks;

pub mod resolver;
pub use resolver::{IdentityProbe, ProbeError, default_probes, resolve_project};

pub mod scheduler;
pub use scheduler::{Scheduler, SchedulerBuilder};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
