// Supervision decisions and per-tick outcomes

use super::observation::WorkerObservation;
use std::fmt;

/// Pool size decision produced by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDecision {
    Idle,
    KillWorkers(usize),
    SpawnWorkers(usize),
}

/// Plugin reload decision produced by the debouncer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadDecision {
    NoAction,
    Reload,
}

/// Why the supervision loop gave up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FatalReason {
    /// The master process is gone (or a zombie)
    MasterTerminated,
    /// No worker ever showed up before the startup deadline
    StartupTimeout,
}

impl fmt::Display for FatalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalReason::MasterTerminated => f.write_str("master process terminated"),
            FatalReason::StartupTimeout => {
                f.write_str("no workers became active within master_timeout")
            }
        }
    }
}

/// Count reconciliation outcome of a tick
///
/// Kill and spawn are mutually exclusive. A plugin-triggered pool reload is
/// not an action of its own; [`TickReport::reloaded`] reports it next to
/// whatever the reconciliation did on the same tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Idle,
    KillWorkers(usize),
    SpawnWorkers(usize),
    FatalAbort(FatalReason),
}

impl Action {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Action::FatalAbort(_))
    }
}

impl From<ScaleDecision> for Action {
    fn from(decision: ScaleDecision) -> Self {
        match decision {
            ScaleDecision::Idle => Action::Idle,
            ScaleDecision::KillWorkers(n) => Action::KillWorkers(n),
            ScaleDecision::SpawnWorkers(n) => Action::SpawnWorkers(n),
        }
    }
}

/// Supervisor lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Startup deadline armed, no worker seen yet
    Starting,
    /// At least one worker was seen running; deadline disarmed for good
    Steady,
}

/// What a single tick observed and did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// None when the tick aborted before inspecting workers
    pub observation: Option<WorkerObservation>,
    /// Whether a plugin-triggered pool reload was dispatched
    pub reloaded: bool,
    /// Count reconciliation outcome (or the fatal abort)
    pub action: Action,
    /// Whether a spawn was a scheduled rolling refresh rather than a scale-up
    pub rolling_refresh: bool,
}

impl TickReport {
    pub fn fatal(observation: Option<WorkerObservation>, reason: FatalReason) -> Self {
        Self {
            observation,
            reloaded: false,
            action: Action::FatalAbort(reason),
            rolling_refresh: false,
        }
    }
}
