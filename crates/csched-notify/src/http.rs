use async_trait::async_trait;
use reqwest::{
    Client, Method, Url,
    header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use csched_model::Payload;

use crate::{Notify, NotifyConfig, NotifyError};

/// Notifier delivering payloads to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: Client,
    method: Method,
    url: Url,
    cfg: NotifyConfig,
}

impl HttpNotifier {
    pub fn new(cfg: NotifyConfig) -> Result<Self, NotifyError> {
        let url = Url::parse(&cfg.url).map_err(|e| NotifyError::InvalidUrl {
            url: cfg.url.clone(),
            reason: e.to_string(),
        })?;
        let method = Method::from_bytes(cfg.method.trim().as_bytes())
            .map_err(|_| NotifyError::InvalidMethod(cfg.method.clone()))?;
        let client = Client::builder().build().map_err(NotifyError::Client)?;

        Ok(Self {
            client,
            method,
            url,
            cfg,
        })
    }

    pub fn config(&self) -> &NotifyConfig {
        &self.cfg
    }

    /// Single delivery attempt bounded by the configured timeout.
    async fn attempt(&self, payload: &Payload) -> Result<(), NotifyError> {
        let body = serde_json::to_vec(payload)?;

        let mut req = self
            .client
            .request(self.method.clone(), self.url.clone())
            .timeout(self.cfg.timeout)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(auth) = &self.cfg.authorization {
            req = req.header(AUTHORIZATION, auth);
        }
        if let Some(agent) = &self.cfg.user_agent {
            req = req.header(USER_AGENT, agent);
        }

        let res = req.send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notify for HttpNotifier {
    async fn notify(
        &self,
        payload: &Payload,
        cancel: &CancellationToken,
    ) -> Result<(), NotifyError> {
        let mut left = self.cfg.retries;
        loop {
            let err = match self.attempt(payload).await {
                Ok(()) => {
                    info!(
                        target: "csched.notify",
                        service = %payload.service,
                        "notification delivered"
                    );
                    return Ok(());
                }
                Err(e) => e,
            };
            if left == 0 {
                warn!(
                    target: "csched.notify",
                    service = %payload.service,
                    error = %err,
                    "last notification attempt failed"
                );
                break;
            }
            warn!(
                target: "csched.notify",
                service = %payload.service,
                left,
                error = %err,
                "notification attempt failed"
            );
            left -= 1;

            tokio::select! {
                _ = tokio::time::sleep(self.cfg.interval) => {}
                _ = cancel.cancelled() => return Err(NotifyError::Cancelled),
            }
        }
        Err(NotifyError::Exhausted)
    }
}
