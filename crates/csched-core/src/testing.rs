//! In-memory doubles for the runtime and the notifier.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use tokio_util::sync::CancellationToken;

use csched_model::{LABEL_PROJECT, LABEL_SCHEDULE, LABEL_SERVICE, Labels, Payload};
use csched_notify::{Notify, NotifyError};

use crate::{OutputStream, Runtime, RuntimeError, UnitSummary, WaitStatus};

pub fn labels(pairs: &[(&str, &str)]) -> Labels {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Scripted outcome of [`Runtime::wait`].
#[derive(Debug, Clone)]
pub enum FakeWait {
    Exit(i64),
    /// Runtime-reported error alongside status code 0.
    Error(String),
    /// The wait call itself fails.
    Fail(String),
    /// Never returns.
    Hang,
}

/// Scripted exec behaviour of a unit.
#[derive(Debug, Clone, Default)]
pub struct FakeExec {
    pub output: Vec<Bytes>,
    pub exit_code: Option<i64>,
    pub start_error: Option<String>,
}

/// Journal entry of every runtime call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListUnits(String),
    InspectLabels(String),
    Start(String),
    Wait(String),
    ExecCreate {
        id: String,
        command: Vec<String>,
        attach: bool,
    },
    ExecStart(String),
    ExecAttach(String),
    ExecExitCode(String),
}

#[derive(Default)]
struct State {
    units: Vec<UnitSummary>,
    waits: HashMap<String, FakeWait>,
    start_errors: HashMap<String, String>,
    execs: HashMap<String, FakeExec>,
    /// exec id -> unit id
    exec_owner: HashMap<String, String>,
    list_error: Option<String>,
    calls: Vec<Call>,
}

#[derive(Default, Clone)]
pub struct FakeRuntime {
    state: Arc<Mutex<State>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(self, id: &str, labels: Labels) -> Self {
        self.lock().units.push(UnitSummary::new(id, labels));
        self
    }

    pub fn with_wait(self, id: &str, wait: FakeWait) -> Self {
        self.lock().waits.insert(id.to_string(), wait);
        self
    }

    pub fn with_start_error(self, id: &str, message: &str) -> Self {
        self.lock()
            .start_errors
            .insert(id.to_string(), message.to_string());
        self
    }

    pub fn with_exec(self, id: &str, exec: FakeExec) -> Self {
        self.lock().execs.insert(id.to_string(), exec);
        self
    }

    pub fn failing_list(self, message: &str) -> Self {
        self.lock().list_error = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: Call) {
        self.lock().calls.push(call);
    }

    fn exec_of(&self, exec_id: &str) -> Result<FakeExec, RuntimeError> {
        let state = self.lock();
        state
            .exec_owner
            .get(exec_id)
            .and_then(|owner| state.execs.get(owner))
            .cloned()
            .ok_or_else(|| RuntimeError::NotFound(exec_id.to_string()))
    }
}

#[async_trait]
impl Runtime for FakeRuntime {
    async fn list_units(&self, project: &str) -> Result<Vec<UnitSummary>, RuntimeError> {
        self.record(Call::ListUnits(project.to_string()));
        let state = self.lock();
        if let Some(msg) = &state.list_error {
            return Err(RuntimeError::Connect(msg.clone()));
        }
        Ok(state
            .units
            .iter()
            .filter(|u| {
                u.label(LABEL_PROJECT) == Some(project)
                    && u.labels.contains_key(LABEL_SERVICE)
                    && u.labels.contains_key(LABEL_SCHEDULE)
            })
            .cloned()
            .collect())
    }

    async fn inspect_labels(&self, id: &str) -> Result<Labels, RuntimeError> {
        self.record(Call::InspectLabels(id.to_string()));
        self.lock()
            .units
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.labels.clone())
            .ok_or_else(|| RuntimeError::NotFound(id.to_string()))
    }

    async fn start(&self, id: &str) -> Result<(), RuntimeError> {
        self.record(Call::Start(id.to_string()));
        match self.lock().start_errors.get(id) {
            Some(msg) => Err(RuntimeError::Api(msg.clone())),
            None => Ok(()),
        }
    }

    async fn wait(&self, id: &str) -> Result<WaitStatus, RuntimeError> {
        self.record(Call::Wait(id.to_string()));
        let wait = self
            .lock()
            .waits
            .get(id)
            .cloned()
            .unwrap_or(FakeWait::Exit(0));
        match wait {
            FakeWait::Exit(code) => Ok(WaitStatus::exited(code)),
            FakeWait::Error(msg) => Ok(WaitStatus {
                status_code: 0,
                error: Some(msg),
            }),
            FakeWait::Fail(msg) => Err(RuntimeError::Api(msg)),
            FakeWait::Hang => std::future::pending().await,
        }
    }

    async fn exec_create(
        &self,
        id: &str,
        command: &[String],
        attach: bool,
    ) -> Result<String, RuntimeError> {
        self.record(Call::ExecCreate {
            id: id.to_string(),
            command: command.to_vec(),
            attach,
        });
        let mut state = self.lock();
        if !state.execs.contains_key(id) {
            return Err(RuntimeError::NotFound(id.to_string()));
        }
        let exec_id = format!("exec-{}", state.exec_owner.len() + 1);
        state.exec_owner.insert(exec_id.clone(), id.to_string());
        Ok(exec_id)
    }

    async fn exec_start(&self, exec_id: &str) -> Result<(), RuntimeError> {
        self.record(Call::ExecStart(exec_id.to_string()));
        match self.exec_of(exec_id)?.start_error {
            Some(msg) => Err(RuntimeError::Api(msg)),
            None => Ok(()),
        }
    }

    async fn exec_attach(&self, exec_id: &str) -> Result<OutputStream, RuntimeError> {
        self.record(Call::ExecAttach(exec_id.to_string()));
        let exec = self.exec_of(exec_id)?;
        if let Some(msg) = exec.start_error {
            return Err(RuntimeError::Api(msg));
        }
        Ok(Box::pin(stream::iter(exec.output.into_iter().map(Ok))))
    }

    async fn exec_exit_code(&self, exec_id: &str) -> Result<Option<i64>, RuntimeError> {
        self.record(Call::ExecExitCode(exec_id.to_string()));
        Ok(self.exec_of(exec_id)?.exit_code)
    }
}

/// Notifier that keeps every payload it was handed.
#[derive(Default)]
pub struct RecordingNotifier {
    payloads: Mutex<Vec<Payload>>,
    failures: AtomicUsize,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `n` payloads after recording them.
    pub fn failing(n: usize) -> Self {
        Self {
            failures: AtomicUsize::new(n),
            ..Self::default()
        }
    }

    pub fn payloads(&self) -> Vec<Payload> {
        self.payloads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Notify for RecordingNotifier {
    async fn notify(
        &self,
        payload: &Payload,
        _cancel: &CancellationToken,
    ) -> Result<(), NotifyError> {
        self.payloads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(payload.clone());
        let fail = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail {
            return Err(NotifyError::Exhausted);
        }
        Ok(())
    }
}
