// Process table port
// reason: process enumeration races are inherent to the domain, model them explicitly

use crate::domain::Pid;
use thiserror::Error;

/// Per-process inspection failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessTableError {
    /// The process exited between enumeration and inspection
    #[error("No such process: {0}")]
    NoSuchProcess(Pid),

    #[error("Access denied to process: {0}")]
    AccessDenied(Pid),
}

/// Read access to the OS process tree
///
/// Implementations:
/// - SysinfoProcessTable: live OS process table (infra-system)
/// - mocks::FakeProcessTable: in-memory table for tests
pub trait ProcessTable: Send + Sync {
    /// Whether `pid` currently exists as a live (non-zombie) process
    fn exists(&self, pid: Pid) -> bool;

    /// Immediate children of `pid` at enumeration time
    ///
    /// Returned PIDs may already be gone by the time the caller looks at them.
    fn children(&self, pid: Pid) -> Vec<Pid>;

    /// Command line of `pid`; the first element is the process title
    ///
    /// # Errors
    /// - ProcessTableError::NoSuchProcess if the process has exited
    /// - ProcessTableError::AccessDenied if the caller may not inspect it
    fn cmdline(&self, pid: Pid) -> Result<Vec<String>, ProcessTableError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    enum FakeState {
        Alive,
        /// Still listed as a child, but gone once inspected
        Vanished,
        Denied,
    }

    #[derive(Debug, Clone)]
    struct FakeProcess {
        parent: Option<Pid>,
        cmdline: Vec<String>,
        state: FakeState,
    }

    /// In-memory process table
    #[derive(Default)]
    pub struct FakeProcessTable {
        processes: Mutex<BTreeMap<Pid, FakeProcess>>,
        next_pid: Mutex<Pid>,
    }

    impl FakeProcessTable {
        /// Table holding a single live master process
        pub fn with_master(master: Pid) -> Self {
            let table = Self {
                processes: Mutex::new(BTreeMap::new()),
                next_pid: Mutex::new(master + 1000),
            };
            table.insert(master, None, vec!["master".to_string()], FakeState::Alive);
            table
        }

        fn insert(&self, pid: Pid, parent: Option<Pid>, cmdline: Vec<String>, state: FakeState) {
            self.processes.lock().unwrap().insert(
                pid,
                FakeProcess {
                    parent,
                    cmdline,
                    state,
                },
            );
        }

        fn allocate_pid(&self) -> Pid {
            let mut next = self.next_pid.lock().unwrap();
            *next += 1;
            *next
        }

        /// Add a live child with the given command line, returning its PID
        pub fn add_child(&self, parent: Pid, cmdline: &[&str]) -> Pid {
            let pid = self.allocate_pid();
            let cmdline = cmdline.iter().map(|s| s.to_string()).collect();
            self.insert(pid, Some(parent), cmdline, FakeState::Alive);
            pid
        }

        /// Replace all children of `master` with `running` workers, `ready` of them ready
        pub fn set_workers(&self, master: Pid, running: usize, ready: usize, marker: &str) {
            self.processes
                .lock()
                .unwrap()
                .retain(|_, p| p.parent != Some(master));
            let ready_title = format!("{}worker", marker);
            for i in 0..running {
                if i < ready {
                    self.add_child(master, &[ready_title.as_str()]);
                } else {
                    self.add_child(master, &["worker"]);
                }
            }
        }

        /// Simulate a child exiting after it was enumerated
        pub fn vanish(&self, pid: Pid) {
            if let Some(p) = self.processes.lock().unwrap().get_mut(&pid) {
                p.state = FakeState::Vanished;
            }
        }

        /// Make inspecting `pid` fail with AccessDenied
        pub fn deny(&self, pid: Pid) {
            if let Some(p) = self.processes.lock().unwrap().get_mut(&pid) {
                p.state = FakeState::Denied;
            }
        }

        /// Remove a process entirely (e.g. the master dying)
        pub fn remove(&self, pid: Pid) {
            self.processes.lock().unwrap().remove(&pid);
        }
    }

    impl ProcessTable for FakeProcessTable {
        fn exists(&self, pid: Pid) -> bool {
            matches!(
                self.processes.lock().unwrap().get(&pid),
                Some(FakeProcess {
                    state: FakeState::Alive | FakeState::Denied,
                    ..
                })
            )
        }

        fn children(&self, pid: Pid) -> Vec<Pid> {
            self.processes
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, p)| p.parent == Some(pid))
                .map(|(child, _)| *child)
                .collect()
        }

        fn cmdline(&self, pid: Pid) -> Result<Vec<String>, ProcessTableError> {
            match self.processes.lock().unwrap().get(&pid) {
                Some(FakeProcess {
                    state: FakeState::Alive,
                    cmdline,
                    ..
                }) => Ok(cmdline.clone()),
                Some(FakeProcess {
                    state: FakeState::Denied,
                    ..
                }) => Err(ProcessTableError::AccessDenied(pid)),
                _ => Err(ProcessTableError::NoSuchProcess(pid)),
            }
        }
    }
}
