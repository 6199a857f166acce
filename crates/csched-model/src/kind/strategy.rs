/// Execution strategy of a scheduled task.
///
/// Selected once when the task is materialized from unit labels and never changed afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Strategy {
    /// Start the unit and block until it is no longer running.
    Run,
    /// Invoke a command inside an already running unit.
    Exec {
        /// Command tokens (program followed by arguments). Never empty.
        command: Vec<String>,
        /// Attach to the command output, stream it to the log and check the exit code.
        ///
        /// When disabled the command is started detached and only the start itself is checked.
        logging: bool,
    },
}

impl Strategy {
    /// Pick the strategy from discovery data: no command tokens means [`Strategy::Run`].
    pub fn from_command(command: Vec<String>, logging: bool) -> Self {
        if command.is_empty() {
            Strategy::Run
        } else {
            Strategy::Exec { command, logging }
        }
    }

    /// Returns a short symbolic identifier for logging and routing:
    /// - `"run"`
    /// - `"exec"`
    /// - `"exec-attach"`
    pub fn kind(&self) -> &'static str {
        match self {
            Strategy::Run => "run",
            Strategy::Exec { logging: false, .. } => "exec",
            Strategy::Exec { logging: true, .. } => "exec-attach",
        }
    }

    /// Command tokens; empty for [`Strategy::Run`].
    pub fn command(&self) -> &[String] {
        match self {
            Strategy::Run => &[],
            Strategy::Exec { command, .. } => command,
        }
    }

    /// Whether the command output is streamed to the log.
    pub fn logging(&self) -> bool {
        matches!(self, Strategy::Exec { logging: true, .. })
    }
}
