// Process Manager Port
// Requests sent to the external process manager that owns the worker pool

use crate::domain::Pid;
use async_trait::async_trait;
use thiserror::Error;

/// Process manager errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessManagerError {
    #[error("Signal {signal} to pid {pid} failed: {reason}")]
    Signal {
        pid: Pid,
        signal: String,
        reason: String,
    },

    #[error("Terminate failed: {0}")]
    Terminate(String),
}

/// Fire-and-forget pool actions
///
/// Implementations return once the request is issued; they never wait for
/// the pool to converge. Convergence is observed on later ticks.
///
/// Implementations:
/// - SignalProcessManager: TTIN/TTOU/HUP master signals (infra-system)
/// - mocks::RecordingProcessManager: records calls for tests
#[async_trait]
pub trait ProcessManager: Send + Sync {
    /// Ask the master for `count` additional workers
    async fn spawn_workers(&self, count: usize) -> Result<(), ProcessManagerError>;

    /// Ask the master to retire its `count` oldest workers
    ///
    /// Which workers are oldest is decided by the master, not the supervisor.
    async fn kill_oldest_workers(&self, count: usize) -> Result<(), ProcessManagerError>;

    /// Ask the master to replace its whole worker set (graceful reload)
    async fn reload_master(&self) -> Result<(), ProcessManagerError>;
}

/// Tears down the master process tree after a fatal abort or shutdown
#[async_trait]
pub trait MasterTerminator: Send + Sync {
    async fn terminate_tree(&self, master: Pid) -> Result<(), ProcessManagerError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// A call received by the recording manager
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ManagerCall {
        Spawn(usize),
        Kill(usize),
        Reload,
        Terminate(Pid),
    }

    /// Records every request; can be told to fail
    #[derive(Default, Clone)]
    pub struct RecordingProcessManager {
        calls: Arc<Mutex<Vec<ManagerCall>>>,
        fail: Arc<Mutex<bool>>,
    }

    impl RecordingProcessManager {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<ManagerCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn clear(&self) {
            self.calls.lock().unwrap().clear();
        }

        pub fn set_failing(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }

        fn record(&self, call: ManagerCall) -> Result<(), ProcessManagerError> {
            self.calls.lock().unwrap().push(call.clone());
            if *self.fail.lock().unwrap() {
                return Err(ProcessManagerError::Signal {
                    pid: 0,
                    signal: format!("{:?}", call),
                    reason: "mock failure".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ProcessManager for RecordingProcessManager {
        async fn spawn_workers(&self, count: usize) -> Result<(), ProcessManagerError> {
            self.record(ManagerCall::Spawn(count))
        }

        async fn kill_oldest_workers(&self, count: usize) -> Result<(), ProcessManagerError> {
            self.record(ManagerCall::Kill(count))
        }

        async fn reload_master(&self) -> Result<(), ProcessManagerError> {
            self.record(ManagerCall::Reload)
        }
    }

    #[async_trait]
    impl MasterTerminator for RecordingProcessManager {
        async fn terminate_tree(&self, master: Pid) -> Result<(), ProcessManagerError> {
            self.record(ManagerCall::Terminate(master))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_recording_manager_records_in_order() {
            let manager = RecordingProcessManager::new();
            tokio_test::block_on(async {
                manager.spawn_workers(2).await.unwrap();
                manager.kill_oldest_workers(1).await.unwrap();
                manager.reload_master().await.unwrap();
            });
            assert_eq!(
                manager.calls(),
                vec![
                    ManagerCall::Spawn(2),
                    ManagerCall::Kill(1),
                    ManagerCall::Reload
                ]
            );
        }

        #[test]
        fn test_failing_manager_still_records() {
            let manager = RecordingProcessManager::new();
            manager.set_failing(true);
            let result = tokio_test::block_on(manager.terminate_tree(7));
            assert!(result.is_err());
            assert_eq!(manager.calls(), vec![ManagerCall::Terminate(7)]);
        }
    }
}
