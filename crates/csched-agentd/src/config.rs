use std::time::Duration;

use clap::Parser;

use csched_notify::NotifyConfig;
use csched_observe::{LoggerConfig, LoggerFormat};

/// Cron scheduler for compose services.
#[derive(Debug, Clone, Parser)]
#[command(name = "csched", version, about)]
pub struct Config {
    /// Compose project to schedule; detected from the own container when empty.
    #[arg(long, env = "PROJECT")]
    pub project: Option<String>,

    /// Endpoint receiving run outcomes; notifications are disabled when unset.
    #[arg(long, env = "NOTIFY_URL")]
    pub notify_url: Option<String>,

    /// Additional attempts after the first failed delivery.
    #[arg(long, env = "NOTIFY_RETRIES", default_value_t = 5)]
    pub notify_retries: u32,

    /// Pause between delivery attempts.
    #[arg(long, env = "NOTIFY_INTERVAL", default_value = "12s", value_parser = parse_duration)]
    pub notify_interval: Duration,

    #[arg(long, env = "NOTIFY_METHOD", default_value = "POST")]
    pub notify_method: String,

    /// Upper bound of a single delivery attempt.
    #[arg(long, env = "NOTIFY_TIMEOUT", default_value = "30s", value_parser = parse_duration)]
    pub notify_timeout: Duration,

    /// Value of the Authorization header.
    #[arg(long, env = "NOTIFY_AUTHORIZATION", hide_env_values = true)]
    pub notify_authorization: Option<String>,

    /// text, json or journald.
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: LoggerFormat,

    /// Filter directive, e.g. `info` or `info,csched_core=debug`.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn logger(&self) -> LoggerConfig {
        LoggerConfig::new(self.log_format, self.log_level.clone())
    }

    pub fn notify(&self) -> Option<NotifyConfig> {
        let url = self.notify_url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        Some(NotifyConfig {
            url: url.to_string(),
            method: self.notify_method.clone(),
            retries: self.notify_retries,
            interval: self.notify_interval,
            timeout: self.notify_timeout,
            authorization: self
                .notify_authorization
                .clone()
                .filter(|a| !a.is_empty()),
            user_agent: Some(concat!("csched/", env!("CARGO_PKG_VERSION")).to_string()),
        })
    }
}

/// `12s`, `500ms`, `1h 30m` or bare seconds.
fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(raw).map_err(|e| e.to_string())
}
