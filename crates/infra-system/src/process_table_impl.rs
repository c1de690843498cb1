// Process table implementation
// reason: sysinfo for cross-platform process enumeration
use std::sync::{Mutex, MutexGuard, PoisonError};
use sysinfo::{Pid as SysPid, ProcessRefreshKind, ProcessStatus, System, UpdateKind};
use tracing::trace;

use poolwarden_core::domain::Pid;
use poolwarden_core::port::{ProcessTable, ProcessTableError};

/// Process table backed by a sysinfo snapshot
///
/// Command lines are re-read on every refresh: workers rewrite their process
/// title in place once ready, and sysinfo neither loads nor updates `cmd`
/// with its default refresh kind.
pub struct SysinfoProcessTable {
    system: Mutex<System>,
}

impl SysinfoProcessTable {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }

    fn system(&self) -> MutexGuard<'_, System> {
        self.system.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cmd_refresh() -> ProcessRefreshKind {
        ProcessRefreshKind::new().with_cmd(UpdateKind::Always)
    }
}

impl Default for SysinfoProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SysinfoProcessTable {
    fn exists(&self, pid: Pid) -> bool {
        let mut sys = self.system();
        let pid = SysPid::from_u32(pid);
        if !sys.refresh_process(pid) {
            return false;
        }
        // An unreaped master is as dead as a missing one
        sys.process(pid).is_some_and(|p| {
            !matches!(p.status(), ProcessStatus::Zombie | ProcessStatus::Dead)
        })
    }

    fn children(&self, pid: Pid) -> Vec<Pid> {
        let mut sys = self.system();
        sys.refresh_processes_specifics(Self::cmd_refresh());

        let parent = SysPid::from_u32(pid);
        // Linux lists threads as tasks of their process; they are not workers
        let threads = sys
            .process(parent)
            .and_then(|p| p.tasks())
            .cloned()
            .unwrap_or_default();

        let mut children: Vec<Pid> = sys
            .processes()
            .iter()
            .filter(|(child, p)| p.parent() == Some(parent) && !threads.contains(*child))
            .map(|(child, _)| child.as_u32())
            .collect();
        children.sort_unstable();

        trace!(master_pid = pid, children = ?children, "Children enumerated");
        children
    }

    fn cmdline(&self, pid: Pid) -> Result<Vec<String>, ProcessTableError> {
        let mut sys = self.system();
        let sys_pid = SysPid::from_u32(pid);
        if !sys.refresh_process_specifics(sys_pid, Self::cmd_refresh()) {
            return Err(ProcessTableError::NoSuchProcess(pid));
        }
        sys.process(sys_pid)
            .map(|p| p.cmd().to_vec())
            .ok_or(ProcessTableError::NoSuchProcess(pid))
    }
}
