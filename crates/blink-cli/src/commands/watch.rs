//! Long-running tracking of files for drift.

use anyhow::{bail, Context, Result};
use blink_core::{BlinkConfig, DriftEvent, Monitor, Registry};
use clap::Args;
use colored::Colorize;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Files to track, in addition to any listed in the config
    pub paths: Vec<PathBuf>,
    /// Path to a blink.toml
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Re-hash interval in milliseconds (overrides the config)
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

/// Merge command-line arguments with the optional config file.
pub fn resolve(args: &WatchArgs) -> Result<(Vec<PathBuf>, Duration)> {
    let config = match &args.config {
        Some(path) => BlinkConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BlinkConfig::default(),
    };

    let mut paths = config.track.clone();
    paths.extend(args.paths.iter().cloned());
    if paths.is_empty() {
        bail!("nothing to watch: pass paths or a config with `track`");
    }

    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.interval());
    if interval.is_zero() {
        bail!("interval must be greater than zero");
    }
    Ok((paths, interval))
}

/// Handle `blink watch`, running until Ctrl-C.
pub async fn cmd_watch(args: WatchArgs) -> Result<()> {
    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    run(args, shutdown).await
}

/// Track the requested files and report drift until `shutdown` resolves.
pub async fn run(args: WatchArgs, shutdown: impl Future<Output = ()>) -> Result<()> {
    let (paths, interval) = resolve(&args)?;

    let registry = Arc::new(Registry::new());
    for path in &paths {
        registry.track(path);
    }
    if registry.is_empty() {
        bail!("none of the requested files could be tracked");
    }
    info!(tracked = registry.len(), requested = paths.len(), "tracking files");

    let mut events = registry.subscribe();
    let monitor = Monitor::spawn(Arc::clone(&registry), interval);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            event = events.recv() => match event {
                Ok(event) => print_drift(&event),
                Err(RecvError::Lagged(missed)) => warn!(missed, "drift events dropped"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    monitor.stop().await;
    Ok(())
}

fn print_drift(event: &DriftEvent) {
    println!(
        "{} {} {} -> {} (time {})",
        "drift".yellow().bold(),
        event.path.display(),
        event.previous.bound,
        event.current.bound,
        event.current.time
    );
}
