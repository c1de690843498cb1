//! Poolwarden - Worker-pool supervisor entry point
//!
//! Keeps the worker pool of one already-running master process at its target
//! size. On Ctrl+C or SIGTERM the supervisor stops and the master tree is
//! torn down; on a fatal condition the tree is torn down and the process
//! exits with a non-zero status.

#[cfg(not(unix))]
compile_error!("poolwarden signals a POSIX master process and needs a unix target");

mod config;
mod logging;

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing::{error, info};

use poolwarden_core::application::{shutdown_channel, SupervisionLoop};
use poolwarden_core::port::time_provider::SystemTimeProvider;
use poolwarden_core::port::MasterTerminator;
use poolwarden_core::{SupervisorError, VERSION};
use poolwarden_infra_system::{
    SignalMasterTerminator, SignalProcessManager, SysinfoProcessTable, WalkdirPluginTree,
};

use crate::config::DaemonConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging (guard flushes the file writer on exit)
    let _log_guard = logging::init_logging()?;

    info!("Poolwarden v{} starting...", VERSION);

    // 2. Load configuration
    let config = DaemonConfig::from_env()?;
    let master_pid = config.supervisor.master_pid;

    info!(
        master_pid,
        target_workers = config.supervisor.target_worker_count,
        plugins_dir = %config.supervisor.plugins_dir.display(),
        reload_on_plugin_change = config.supervisor.reload_on_plugin_change,
        "Configuration loaded"
    );

    // 3. Setup dependencies (DI wiring)
    let process_table = Arc::new(SysinfoProcessTable::new());
    let plugin_tree = Arc::new(WalkdirPluginTree::new());
    let process_manager = Arc::new(SignalProcessManager::new(master_pid));
    let time_provider = Arc::new(SystemTimeProvider);
    let terminator =
        SignalMasterTerminator::with_grace(process_table.clone(), config.terminate_grace);

    let mut supervisor = SupervisionLoop::new(
        config.supervisor,
        process_table,
        plugin_tree,
        process_manager,
        time_provider,
    )?;

    // 4. Start supervision loop
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let mut supervisor_handle = tokio::spawn(async move { supervisor.run(shutdown_rx).await });

    info!("Supervising master. Press Ctrl+C to shutdown");

    // 5. Wait for the loop to end on its own or for a stop signal
    let finished = tokio::select! {
        result = &mut supervisor_handle => Some(result),
        signal = wait_for_stop_signal() => {
            signal?;
            None
        }
    };

    let outcome = match finished {
        Some(result) => result,
        None => {
            info!("Shutdown signal received. Stopping supervisor...");
            shutdown_tx.shutdown();
            supervisor_handle.await
        }
    }
    .context("Supervisor task panicked")?;

    // 6. Tear down the master tree either way
    match outcome {
        Ok(()) => {
            info!(master_pid, "Terminating master process tree...");
            terminator
                .terminate_tree(master_pid)
                .await
                .map_err(|e| anyhow!("Master teardown failed: {}", e))?;
            info!("Shutdown complete.");
            Ok(())
        }
        Err(SupervisorError::FatalAbort(reason)) => {
            error!(master_pid, reason = %reason, "Fatal supervisor condition, tearing down master");
            if let Err(e) = terminator.terminate_tree(master_pid).await {
                error!(master_pid, error = %e, "Master teardown failed");
            }
            Err(anyhow!("Supervisor aborted: {}", reason))
        }
        Err(e) => Err(e.into()),
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn wait_for_stop_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }
    Ok(())
}
