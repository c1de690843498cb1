// Supervision loop - keeps the master's worker pool at target size

pub mod constants;
mod shutdown;

pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::{decide, PluginSignatureBuilder, ProcessInspector, ReloadDebouncer};
use crate::domain::{
    Action, FatalReason, Phase, ReloadDecision, ScaleDecision, SupervisorConfig, TickReport,
    WorkerObservation,
};
use crate::error::{Result, SupervisorError};
use crate::port::{PluginTree, ProcessManager, ProcessTable, TimeProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Mutable loop state, owned exclusively by the loop
struct SupervisorState {
    start_time: Instant,
    last_refresh_time: Instant,
    debouncer: ReloadDebouncer,
    ever_saw_running_worker: bool,
}

/// Drives one master's worker pool: scaling, rolling refresh, plugin reload
///
/// Every tick runs to completion before the next one starts. Pool actions are
/// requests to the external process manager; their effect is observed on
/// later ticks.
pub struct SupervisionLoop {
    config: SupervisorConfig,
    inspector: ProcessInspector,
    signatures: PluginSignatureBuilder,
    process_manager: Arc<dyn ProcessManager>,
    time_provider: Arc<dyn TimeProvider>,
    state: SupervisorState,
}

impl SupervisionLoop {
    /// Create a supervision loop
    ///
    /// # Errors
    /// - SupervisorError::Domain if the configuration is invalid
    pub fn new(
        config: SupervisorConfig,
        process_table: Arc<dyn ProcessTable>,
        plugin_tree: Arc<dyn PluginTree>,
        process_manager: Arc<dyn ProcessManager>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Result<Self> {
        config.validate()?;

        let now = time_provider.now();
        let inspector = ProcessInspector::new(process_table, config.ready_marker.clone());
        let signatures = PluginSignatureBuilder::new(plugin_tree, config.plugins_dir.clone());

        Ok(Self {
            config,
            inspector,
            signatures,
            process_manager,
            time_provider,
            state: SupervisorState {
                start_time: now,
                last_refresh_time: now,
                debouncer: ReloadDebouncer::new(),
                ever_saw_running_worker: false,
            },
        })
    }

    pub fn phase(&self) -> Phase {
        if self.state.ever_saw_running_worker {
            Phase::Steady
        } else {
            Phase::Starting
        }
    }

    /// Run until stopped or until a fatal condition
    ///
    /// Returns Ok(()) when `shutdown` fires and
    /// `Err(SupervisorError::FatalAbort)` when the pool cannot be supervised
    /// any more; the caller then owns tearing down the master tree.
    pub async fn run(&mut self, mut shutdown: ShutdownToken) -> Result<()> {
        info!(
            master_pid = self.config.master_pid,
            target_workers = self.config.target_worker_count,
            batch_size = self.config.refresh_batch_size,
            startup_timeout_secs = self.config.startup_timeout.as_secs(),
            refresh_interval_secs = self.config.refresh_interval.as_secs(),
            reload_on_plugin_change = self.config.reload_on_plugin_change,
            "Supervisor started"
        );

        loop {
            if shutdown.is_shutdown() {
                info!("Supervisor shutting down");
                break;
            }

            let report = self.tick().await;
            if let Action::FatalAbort(reason) = report.action {
                error!(
                    master_pid = self.config.master_pid,
                    reason = %reason,
                    "Supervisor aborting"
                );
                return Err(SupervisorError::FatalAbort(reason));
            }

            tokio::select! {
                _ = sleep(self.config.tick_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Supervisor interrupted while waiting for next tick");
                    break;
                }
            }
        }

        info!(master_pid = self.config.master_pid, "Supervisor stopped");
        Ok(())
    }

    /// Run a single supervision tick
    pub async fn tick(&mut self) -> TickReport {
        let master = self.config.master_pid;

        if !self.inspector.master_alive(master) {
            return TickReport::fatal(None, FatalReason::MasterTerminated);
        }

        let observation = self.inspector.observe(master);
        let now = self.time_provider.now();

        if observation.running > 0 && !self.state.ever_saw_running_worker {
            info!(
                running = observation.running,
                elapsed_ms = now.duration_since(self.state.start_time).as_millis() as u64,
                "First workers active, startup deadline disarmed"
            );
            self.state.ever_saw_running_worker = true;
        }

        if self.phase() == Phase::Starting
            && now.duration_since(self.state.start_time) > self.config.startup_timeout
        {
            return TickReport::fatal(Some(observation), FatalReason::StartupTimeout);
        }

        let reloaded = if self.config.reload_on_plugin_change {
            self.reload_if_plugins_settled(now).await
        } else {
            false
        };

        let (action, rolling_refresh) = self.reconcile(&observation, now).await;

        TickReport {
            observation: Some(observation),
            reloaded,
            action,
            rolling_refresh,
        }
    }

    async fn reload_if_plugins_settled(&mut self, now: Instant) -> bool {
        let signature = self.signatures.build();
        if self.state.debouncer.evaluate(&signature) != ReloadDecision::Reload {
            return false;
        }

        info!(
            plugins_dir = %self.signatures.root().display(),
            files = signature.len(),
            "Plugins settled after change, reloading worker pool"
        );
        if let Err(e) = self.process_manager.reload_master().await {
            // Not committed: the next tick asks again
            warn!(error = %e, "Pool reload request failed");
            return false;
        }

        self.state.debouncer.commit(signature);
        self.state.last_refresh_time = now;
        true
    }

    async fn reconcile(
        &mut self,
        observation: &WorkerObservation,
        now: Instant,
    ) -> (Action, bool) {
        let target = self.config.target_worker_count;
        let batch = self.config.refresh_batch_size;

        match decide(observation.running, target, batch) {
            ScaleDecision::KillWorkers(n) => {
                info!(
                    running = observation.running,
                    target_workers = target,
                    count = n,
                    "Killing excess workers"
                );
                if let Err(e) = self.process_manager.kill_oldest_workers(n).await {
                    warn!(error = %e, count = n, "Kill request failed");
                }
                (Action::KillWorkers(n), false)
            }
            ScaleDecision::SpawnWorkers(n) => {
                info!(
                    running = observation.running,
                    target_workers = target,
                    count = n,
                    "Spawning missing workers"
                );
                if let Err(e) = self.process_manager.spawn_workers(n).await {
                    warn!(error = %e, count = n, "Spawn request failed");
                }
                (Action::SpawnWorkers(n), false)
            }
            ScaleDecision::Idle => {
                let since_refresh = now.duration_since(self.state.last_refresh_time);
                if since_refresh < self.config.refresh_interval {
                    return (Action::Idle, false);
                }

                info!(
                    ready = observation.ready,
                    starting = observation.starting(),
                    count = batch,
                    since_refresh_secs = since_refresh.as_secs(),
                    "Rolling refresh, spawning fresh workers"
                );
                match self.process_manager.spawn_workers(batch).await {
                    Ok(()) => self.state.last_refresh_time = now,
                    Err(e) => warn!(error = %e, count = batch, "Rolling refresh request failed"),
                }
                (Action::SpawnWorkers(batch), true)
            }
        }
    }
}
