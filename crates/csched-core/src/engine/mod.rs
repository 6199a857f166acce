//! Shared cron engine.
//!
//! One loop evaluates every trigger against the wall clock and spawns each due job as its own
//! tokio task. On cancellation the loop stops firing and waits until every spawned job returned.

mod trigger;
pub use trigger::Trigger;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{debug, trace};

/// Callback fired by the engine.
///
/// The token is the ambient cancellation signal; jobs are expected to observe it.
#[async_trait]
pub trait Job: Send + Sync + 'static {
    async fn fire(&self, cancel: CancellationToken);
}

struct Entry {
    name: String,
    trigger: Trigger,
    job: Arc<dyn Job>,
}

#[derive(Default)]
pub struct CronEngine {
    entries: Vec<Entry>,
}

impl CronEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, trigger: Trigger, job: Arc<dyn Job>) {
        self.entries.push(Entry {
            name: name.into(),
            trigger,
            job,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fire jobs until `cancel` is triggered, then wait for in-flight jobs to drain.
    pub async fn run(self, cancel: CancellationToken) {
        let tracker = TaskTracker::new();
        let mut next: Vec<Option<DateTime<Utc>>> = {
            let now = Utc::now();
            self.entries
                .iter()
                .map(|e| e.trigger.next_after(now))
                .collect()
        };

        loop {
            let Some(due) = next.iter().flatten().min().copied() else {
                debug!("no upcoming triggers; idle until shutdown");
                cancel.cancelled().await;
                break;
            };
            let delay = (due - Utc::now()).to_std().unwrap_or(Duration::ZERO);

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            let now = Utc::now();
            for (entry, at) in self.entries.iter().zip(next.iter_mut()) {
                if !matches!(at, Some(at) if *at <= now) {
                    continue;
                }
                trace!(job = %entry.name, "trigger fired");
                let job = Arc::clone(&entry.job);
                let token = cancel.clone();
                tracker.spawn(async move { job.fire(token).await });
                *at = entry.trigger.next_after(now);
            }
        }

        tracker.close();
        debug!(in_flight = tracker.len(), "engine stopped; draining jobs");
        tracker.wait().await;
    }
}
