// Process inspector - counts the master's running and ready workers
use crate::domain::{Pid, WorkerObservation};
use crate::port::{ProcessTable, ProcessTableError};
use std::sync::Arc;
use tracing::{debug, trace};

/// Inspects the immediate children of a master process
///
/// Per-child failures (exited, access denied) make that child count as 0;
/// they never propagate to the caller.
pub struct ProcessInspector {
    table: Arc<dyn ProcessTable>,
    ready_marker: String,
}

impl ProcessInspector {
    pub fn new(table: Arc<dyn ProcessTable>, ready_marker: impl Into<String>) -> Self {
        Self {
            table,
            ready_marker: ready_marker.into(),
        }
    }

    /// Whether the master process is still alive
    pub fn master_alive(&self, master: Pid) -> bool {
        self.table.exists(master)
    }

    /// Number of children still present when inspected
    pub fn count_running(&self, master: Pid) -> usize {
        self.table
            .children(master)
            .into_iter()
            .filter(|child| self.table.exists(*child))
            .count()
    }

    /// Number of children whose process title carries the ready marker
    pub fn count_ready(&self, master: Pid) -> usize {
        self.table
            .children(master)
            .into_iter()
            .filter(|child| self.is_ready(*child))
            .count()
    }

    /// Running and ready counts for one tick
    pub fn observe(&self, master: Pid) -> WorkerObservation {
        let observation =
            WorkerObservation::new(self.count_running(master), self.count_ready(master));
        debug!(
            master_pid = master,
            running = observation.running,
            ready = observation.ready,
            "Workers observed"
        );
        observation
    }

    fn is_ready(&self, child: Pid) -> bool {
        match self.table.cmdline(child) {
            // Zombies report an empty command line
            Ok(cmdline) => cmdline
                .first()
                .is_some_and(|title| title.contains(&self.ready_marker)),
            Err(ProcessTableError::NoSuchProcess(pid)) => {
                trace!(pid, "Worker exited during inspection");
                false
            }
            Err(e) => {
                debug!(pid = child, error = %e, "Worker not inspectable, counted as not ready");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::process_table::mocks::FakeProcessTable;

    const MASTER: Pid = 1;
    const MARKER: &str = "[ready] ";

    fn inspector(table: &Arc<FakeProcessTable>) -> ProcessInspector {
        ProcessInspector::new(table.clone(), MARKER)
    }

    #[test]
    fn test_ready_prefix_on_cmdline() {
        let table = Arc::new(FakeProcessTable::with_master(MASTER));
        table.add_child(MASTER, &["[ready] webserver worker"]);

        assert_eq!(inspector(&table).count_ready(MASTER), 1);
        assert_eq!(inspector(&table).count_running(MASTER), 1);
    }

    #[test]
    fn test_ready_prefix_on_cmdline_no_children() {
        let table = Arc::new(FakeProcessTable::with_master(MASTER));

        assert_eq!(inspector(&table).count_ready(MASTER), 0);
        assert_eq!(inspector(&table).count_running(MASTER), 0);
    }

    #[test]
    fn test_ready_prefix_on_cmdline_zombie() {
        let table = Arc::new(FakeProcessTable::with_master(MASTER));
        table.add_child(MASTER, &[]);

        assert_eq!(inspector(&table).count_ready(MASTER), 0);
    }

    #[test]
    fn test_ready_prefix_on_cmdline_dead_process() {
        let table = Arc::new(FakeProcessTable::with_master(MASTER));
        let child = table.add_child(MASTER, &["[ready] webserver worker"]);
        table.vanish(child);

        let inspector = inspector(&table);
        assert_eq!(inspector.count_ready(MASTER), 0);
        assert_eq!(inspector.count_running(MASTER), 0);
    }

    #[test]
    fn test_marker_only_checked_in_title() {
        let table = Arc::new(FakeProcessTable::with_master(MASTER));
        table.add_child(MASTER, &["worker", "[ready] "]);

        assert_eq!(inspector(&table).count_ready(MASTER), 0);
        assert_eq!(inspector(&table).count_running(MASTER), 1);
    }

    #[test]
    fn test_access_denied_counts_as_not_ready() {
        let table = Arc::new(FakeProcessTable::with_master(MASTER));
        let child = table.add_child(MASTER, &["[ready] worker"]);
        table.deny(child);

        let inspector = inspector(&table);
        assert_eq!(inspector.count_ready(MASTER), 0);
        assert_eq!(inspector.count_running(MASTER), 1);
    }

    #[test]
    fn test_exit_never_increases_counts() {
        let table = Arc::new(FakeProcessTable::with_master(MASTER));
        table.set_workers(MASTER, 4, 3, MARKER);
        let inspector = inspector(&table);
        let before = inspector.observe(MASTER);
        assert_eq!(before, WorkerObservation::new(4, 3));

        for child in table.children(MASTER) {
            table.vanish(child);
            let after = inspector.observe(MASTER);
            assert!(after.running <= before.running);
            assert!(after.ready <= before.ready);
        }
        assert_eq!(inspector.observe(MASTER), WorkerObservation::new(0, 0));
    }

    #[test]
    fn test_master_alive() {
        let table = Arc::new(FakeProcessTable::with_master(MASTER));
        let inspector = inspector(&table);
        assert!(inspector.master_alive(MASTER));

        table.remove(MASTER);
        assert!(!inspector.master_alive(MASTER));
    }
}
