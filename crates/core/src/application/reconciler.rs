// Pool reconciler - pure sizing decision
use crate::domain::ScaleDecision;

/// Decide how to move `running` toward `target`
///
/// Scale-down wins over scale-up, and no decision touches more than
/// `batch_size` workers. Readiness is deliberately not an input: a pool at
/// target size that is still warming up just waits.
pub fn decide(running: usize, target: usize, batch_size: usize) -> ScaleDecision {
    if running > target {
        ScaleDecision::KillWorkers((running - target).min(batch_size))
    } else if running < target {
        ScaleDecision::SpawnWorkers((target - running).min(batch_size))
    } else {
        ScaleDecision::Idle
    }
}
