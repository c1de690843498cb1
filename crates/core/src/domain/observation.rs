// Worker pool observation

/// OS process identifier
pub type Pid = u32;

/// Snapshot of the master's worker children on one tick
///
/// `ready <= running` holds by construction but is not enforced: a child
/// can change state between the two counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerObservation {
    pub running: usize,
    pub ready: usize,
}

impl WorkerObservation {
    pub fn new(running: usize, ready: usize) -> Self {
        Self { running, ready }
    }

    /// Workers alive but still initializing
    pub fn starting(&self) -> usize {
        self.running.saturating_sub(self.ready)
    }
}
