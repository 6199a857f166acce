use std::time::Duration;

/// HTTP notification settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    /// Endpoint receiving the JSON payload.
    pub url: String,
    /// HTTP method (default: `POST`).
    pub method: String,
    /// Additional attempts after the first one (default: 5).
    pub retries: u32,
    /// Pause between attempts (default: 12 seconds).
    pub interval: Duration,
    /// Per-attempt request timeout (default: 30 seconds).
    pub timeout: Duration,
    /// Value of the `Authorization` header, sent only when set.
    pub authorization: Option<String>,
    /// Value of the `User-Agent` header, sent only when set.
    pub user_agent: Option<String>,
}

impl NotifyConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Total number of delivery attempts.
    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: "POST".to_string(),
            retries: 5,
            interval: Duration::from_secs(12),
            timeout: Duration::from_secs(30),
            authorization: None,
            user_agent: None,
        }
    }
}
