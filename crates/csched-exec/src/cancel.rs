use std::future::Future;

use tokio_util::sync::CancellationToken;

use csched_core::RuntimeError;

use crate::error::{ExecError, ExecResult};

/// Await a runtime call unless `cancel` fires first; `step` names the failed call.
pub(crate) async fn cancellable<T, F, S>(
    cancel: &CancellationToken,
    call: F,
    step: S,
) -> ExecResult<T>
where
    F: Future<Output = Result<T, RuntimeError>>,
    S: FnOnce(RuntimeError) -> ExecError,
{
    tokio::select! {
        res = call => res.map_err(step),
        _ = cancel.cancelled() => Err(ExecError::Cancelled),
    }
}
