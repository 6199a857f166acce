use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use csched_model::Payload;

use crate::NotifyError;

/// Sink for run outcomes.
///
/// Implementations own their retry policy; the scheduler calls `notify` once per completed run
/// and only logs the result.
#[async_trait]
pub trait Notify: Send + Sync + 'static {
    async fn notify(
        &self,
        payload: &Payload,
        cancel: &CancellationToken,
    ) -> Result<(), NotifyError>;
}
