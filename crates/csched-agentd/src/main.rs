mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use csched_core::{RunnerRouter, Runtime, Scheduler};
use csched_exec::{DockerRuntime, register_runners};
use csched_notify::HttpNotifier;
use csched_observe::init_logger;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::parse();
    init_logger(&cfg.logger())?;

    let runtime: Arc<dyn Runtime> =
        Arc::new(DockerRuntime::connect().context("create docker client")?);

    let mut router = RunnerRouter::new();
    register_runners(&mut router, Arc::clone(&runtime));

    let mut builder = Scheduler::builder(runtime).with_router(router);
    if let Some(project) = cfg.project.as_deref().filter(|p| !p.is_empty()) {
        builder = builder.with_project(project);
    }
    match cfg.notify() {
        Some(notify) => {
            info!(
                url = %notify.url,
                method = %notify.method,
                retries = notify.retries,
                "notifications enabled"
            );
            let notifier = HttpNotifier::new(notify).context("configure notifier")?;
            builder = builder.with_notifier(Arc::new(notifier));
        }
        None => info!("notifications disabled"),
    }

    let scheduler = builder.build().await.context("resolve project")?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    scheduler.run(cancel).await?;
    info!("bye");
    Ok(())
}

async fn cancel_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
    cancel.cancel();
}
