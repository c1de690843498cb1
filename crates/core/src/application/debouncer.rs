// Reload debouncer - two-phase settle-then-commit change detection
use crate::domain::{PluginSignature, ReloadDecision};
use tracing::debug;

/// Decides when a plugin directory change has settled enough to reload
///
/// A directory can be observed mid-write, so a change must be seen
/// identically on two consecutive evaluations before it is acted on, and a
/// given stable state triggers at most one reload.
#[derive(Debug, Default)]
pub struct ReloadDebouncer {
    last_seen: PluginSignature,
    committed: PluginSignature,
}

impl ReloadDebouncer {
    /// Debouncer with empty seen/committed signatures
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&mut self, current: &PluginSignature) -> ReloadDecision {
        if *current != self.last_seen {
            debug!(
                files = current.len(),
                "Plugins changed, reload once they stop changing"
            );
            self.last_seen = current.clone();
            return ReloadDecision::NoAction;
        }
        if *current != self.committed {
            return ReloadDecision::Reload;
        }
        ReloadDecision::NoAction
    }

    /// Record `signature` as applied by a reload
    pub fn commit(&mut self, signature: PluginSignature) {
        self.committed = signature;
    }

    pub fn last_seen(&self) -> &PluginSignature {
        &self.last_seen
    }

    pub fn committed(&self) -> &PluginSignature {
        &self.committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FileFingerprint;

    fn sig(entries: &[(&str, u64)]) -> PluginSignature {
        entries
            .iter()
            .map(|(path, size)| (*path, FileFingerprint::from_size(*size)))
            .collect()
    }

    /// Evaluate and commit on reload, as the supervision loop does
    fn step(debouncer: &mut ReloadDebouncer, current: &PluginSignature) -> ReloadDecision {
        let decision = debouncer.evaluate(current);
        if decision == ReloadDecision::Reload {
            debouncer.commit(current.clone());
        }
        decision
    }

    #[test]
    fn test_should_reload_when_plugin_has_been_changed() {
        let mut debouncer = ReloadDebouncer::new();
        let ticks = [
            sig(&[]),
            sig(&[("AA", 12)]),
            sig(&[("AA", 32)]),
            sig(&[("AA", 32)]),
        ];
        let decisions: Vec<_> = ticks.iter().map(|s| step(&mut debouncer, s)).collect();

        assert_eq!(
            decisions,
            vec![
                ReloadDecision::NoAction,
                ReloadDecision::NoAction,
                ReloadDecision::NoAction,
                ReloadDecision::Reload
            ]
        );
        assert_eq!(debouncer.committed(), &sig(&[("AA", 32)]));
    }

    #[test]
    fn test_stable_state_reloads_at_most_once() {
        let mut debouncer = ReloadDebouncer::new();
        let changed = sig(&[("plugin.py", 10)]);

        assert_eq!(step(&mut debouncer, &changed), ReloadDecision::NoAction);
        assert_eq!(step(&mut debouncer, &changed), ReloadDecision::Reload);
        for _ in 0..5 {
            assert_eq!(step(&mut debouncer, &changed), ReloadDecision::NoAction);
        }
    }

    #[test]
    fn test_unchanged_directory_never_reloads() {
        let mut debouncer = ReloadDebouncer::new();
        for _ in 0..5 {
            assert_eq!(step(&mut debouncer, &sig(&[])), ReloadDecision::NoAction);
        }
    }

    #[test]
    fn test_change_back_to_committed_state_is_not_reloaded() {
        let baseline = sig(&[("a.py", 1)]);
        let edited = sig(&[("a.py", 2)]);
        let mut debouncer = ReloadDebouncer::new();
        step(&mut debouncer, &baseline);
        assert_eq!(step(&mut debouncer, &baseline), ReloadDecision::Reload);

        // Transient edit reverted before it settled
        assert_eq!(step(&mut debouncer, &edited), ReloadDecision::NoAction);
        assert_eq!(step(&mut debouncer, &baseline), ReloadDecision::NoAction);
        assert_eq!(step(&mut debouncer, &baseline), ReloadDecision::NoAction);
    }

    #[test]
    fn test_uncommitted_reload_keeps_requesting() {
        let mut debouncer = ReloadDebouncer::new();
        let changed = sig(&[("a.py", 1)]);

        debouncer.evaluate(&changed);
        assert_eq!(debouncer.evaluate(&changed), ReloadDecision::Reload);
        assert_eq!(debouncer.evaluate(&changed), ReloadDecision::Reload);
        assert_eq!(debouncer.last_seen(), &changed);
    }
}
