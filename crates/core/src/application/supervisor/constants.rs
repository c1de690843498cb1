// Supervisor runtime constants (No magic values)
// Configuration defaults live next to SupervisorConfig in the domain layer
use std::time::Duration;

/// Grace period between SIGTERM and SIGKILL when tearing down the master (120s)
pub const DEFAULT_TERMINATE_GRACE: Duration = Duration::from_secs(120);

/// Poll period while waiting for the master to exit (100ms)
pub const TERMINATE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Pause between consecutive per-worker signals to the master (100ms)
/// Identical pending signals coalesce, so they must not be sent back to back
pub const SIGNAL_SPACING: Duration = Duration::from_millis(100);
