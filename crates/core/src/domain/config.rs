// Supervisor configuration (immutable, consumed at construction)

use super::error::{DomainError, Result};
use super::observation::Pid;
use std::path::PathBuf;
use std::time::Duration;

/// Sleep between two supervision ticks (1s)
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Default pool size
pub const DEFAULT_TARGET_WORKER_COUNT: usize = 4;

/// How long the master may run without any worker before the supervisor gives up (120s)
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(120);

/// Rolling refresh period (6000s)
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(6000);

/// Workers replaced per rolling refresh, and max workers touched per tick
pub const DEFAULT_REFRESH_BATCH_SIZE: usize = 1;

/// Title prefix a worker sets once it is able to serve requests
pub const DEFAULT_READY_MARKER: &str = "[ready] ";

/// Plugin directory watched for hot reload (tilde-expanded by the daemon)
pub const DEFAULT_PLUGINS_DIR: &str = "~/poolwarden/plugins";

/// Supervisor configuration
///
/// Read once when the loop is built and never re-read mid-run.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// PID of the master process owning the workers
    pub master_pid: Pid,
    /// Pool size the loop converges on (> 0)
    pub target_worker_count: usize,
    /// How long the pool may stay empty before the first worker appears
    pub startup_timeout: Duration,
    /// Period of the rolling refresh
    pub refresh_interval: Duration,
    /// Upper bound on workers killed or spawned per tick (> 0)
    pub refresh_batch_size: usize,
    /// Reload the whole pool once the plugin directory settles after a change
    pub reload_on_plugin_change: bool,
    pub plugins_dir: PathBuf,
    /// Substring a worker puts in its process title once it can serve
    pub ready_marker: String,
    /// Sleep between two ticks
    pub tick_interval: Duration,
}

impl SupervisorConfig {
    /// Configuration with defaults for everything but the master PID
    pub fn new(master_pid: Pid) -> Self {
        Self {
            master_pid,
            target_worker_count: DEFAULT_TARGET_WORKER_COUNT,
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            refresh_batch_size: DEFAULT_REFRESH_BATCH_SIZE,
            reload_on_plugin_change: false,
            plugins_dir: PathBuf::from(DEFAULT_PLUGINS_DIR),
            ready_marker: DEFAULT_READY_MARKER.to_string(),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    /// Reject configurations the loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.target_worker_count == 0 {
            return Err(DomainError::InvalidConfig(
                "target_worker_count must be greater than 0".to_string(),
            ));
        }
        if self.refresh_batch_size == 0 {
            return Err(DomainError::InvalidConfig(
                "refresh_batch_size must be greater than 0".to_string(),
            ));
        }
        if self.tick_interval.is_zero() {
            return Err(DomainError::InvalidConfig(
                "tick_interval must be greater than 0".to_string(),
            ));
        }
        if self.ready_marker.is_empty() {
            return Err(DomainError::InvalidConfig(
                "ready_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
